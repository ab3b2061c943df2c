// Facility endpoints

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{
    CreateFacilityBody, CreateFacilityResponse, FacilitiesResponse, FacilityResponse,
};

impl ApiClient {
    /// List every facility visible to the session.
    ///
    /// `GET facilities`
    pub async fn list_facilities(&self) -> Result<Vec<FacilityResponse>, Error> {
        let resp: FacilitiesResponse = self.get("facilities").await?;
        debug!(count = resp.facilities.len(), "listed facilities");
        Ok(resp.facilities)
    }

    /// Create a facility and return the server's canonical record.
    ///
    /// `POST facilities`
    pub async fn create_facility(
        &self,
        body: &CreateFacilityBody,
    ) -> Result<FacilityResponse, Error> {
        let resp: CreateFacilityResponse = self.post("facilities", body).await?;
        Ok(resp.facility)
    }
}
