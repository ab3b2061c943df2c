// Species endpoints

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{CreateSpeciesBody, CreateSpeciesResponse, SpeciesListResponse, SpeciesResponse};

impl ApiClient {
    /// `GET species`
    pub async fn list_species(&self) -> Result<Vec<SpeciesResponse>, Error> {
        let resp: SpeciesListResponse = self.get("species").await?;
        Ok(resp.species)
    }

    /// `POST species`
    pub async fn create_species(&self, body: &CreateSpeciesBody) -> Result<SpeciesResponse, Error> {
        let resp: CreateSpeciesResponse = self.post("species", body).await?;
        Ok(resp.species)
    }
}
