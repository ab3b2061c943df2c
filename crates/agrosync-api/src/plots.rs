// Plot and sensor-state endpoints

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{
    CreatePlotBody, CreatePlotResponse, PlotHistoryResponse, PlotResponse, PlotStateResponse,
    PlotsResponse,
};

impl ApiClient {
    /// List the plots of one facility.
    ///
    /// `GET facilities/{id}/plots`
    pub async fn list_facility_plots(&self, facility_id: &str) -> Result<Vec<PlotResponse>, Error> {
        let resp: PlotsResponse = self.get(&format!("facilities/{facility_id}/plots")).await?;
        Ok(resp.plots)
    }

    /// `POST plots`
    pub async fn create_plot(&self, body: &CreatePlotBody) -> Result<PlotResponse, Error> {
        let resp: CreatePlotResponse = self.post("plots", body).await?;
        Ok(resp.plot)
    }

    /// Latest sensor snapshot. `Error::NotFound` when no reading exists yet.
    ///
    /// `GET plots/{id}/state`
    pub async fn get_plot_state(&self, plot_id: &str) -> Result<PlotStateResponse, Error> {
        self.get(&format!("plots/{plot_id}/state")).await
    }

    /// Historical snapshots, in the order the backend returns them.
    ///
    /// `GET plots/{id}/history`
    pub async fn get_plot_history(&self, plot_id: &str) -> Result<Vec<PlotStateResponse>, Error> {
        let resp: PlotHistoryResponse = self.get(&format!("plots/{plot_id}/history")).await?;
        Ok(resp.history)
    }
}
