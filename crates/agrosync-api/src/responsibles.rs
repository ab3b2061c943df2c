// Facility alert-recipient endpoints
//
// The PUT is a last-write-wins replacement of the whole list, not a delta.

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{ResponsiblesBody, ResponsiblesResponse};

impl ApiClient {
    /// `GET facilities/{id}/responsibles`
    pub async fn get_responsibles(&self, facility_id: &str) -> Result<Vec<String>, Error> {
        let resp: ResponsiblesResponse =
            self.get(&format!("facilities/{facility_id}/responsibles")).await?;
        Ok(resp.responsibles)
    }

    /// `PUT facilities/{id}/responsibles`
    pub async fn put_responsibles(
        &self,
        facility_id: &str,
        responsibles: &[String],
    ) -> Result<Vec<String>, Error> {
        let body = ResponsiblesBody {
            responsibles: responsibles.to_vec(),
        };
        let resp: ResponsiblesResponse = self
            .put(&format!("facilities/{facility_id}/responsibles"), &body)
            .await?;
        Ok(resp.responsibles)
    }
}
