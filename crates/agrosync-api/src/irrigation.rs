// Irrigation event endpoints

use chrono::NaiveDate;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{
    FacilityIrrigationsResponse, IrrigationEventResponse, IrrigationsResponse,
    LastIrrigationResponse,
};

impl ApiClient {
    /// Most recent irrigation of a plot. `Error::NotFound` when none exists.
    ///
    /// `GET plots/{id}/last-irrigation`
    pub async fn get_last_irrigation(&self, plot_id: &str) -> Result<LastIrrigationResponse, Error> {
        self.get(&format!("plots/{plot_id}/last-irrigation")).await
    }

    /// Every irrigation event of a plot, newest first.
    ///
    /// `GET plots/{id}/irrigations`
    pub async fn list_irrigations(
        &self,
        plot_id: &str,
    ) -> Result<Vec<IrrigationEventResponse>, Error> {
        let resp: IrrigationsResponse = self.get(&format!("plots/{plot_id}/irrigations")).await?;
        Ok(resp.irrigations)
    }

    /// Irrigation events of every plot in a facility on one day.
    /// The backend defaults to today (UTC) when `date` is `None`.
    ///
    /// `GET facilities/{id}/irrigations?date=YYYY-MM-DD`
    pub async fn list_facility_irrigations(
        &self,
        facility_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<FacilityIrrigationsResponse, Error> {
        let path = format!("facilities/{facility_id}/irrigations");
        match date {
            Some(d) => {
                self.get_with_params(&path, &[("date", d.format("%Y-%m-%d").to_string())])
                    .await
            }
            None => self.get(&path).await,
        }
    }
}
