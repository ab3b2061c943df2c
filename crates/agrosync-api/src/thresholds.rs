// Per-plot threshold endpoints

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::ThresholdsBody;

impl ApiClient {
    /// `GET plots/{id}/thresholds`
    pub async fn get_plot_thresholds(&self, plot_id: &str) -> Result<ThresholdsBody, Error> {
        self.get(&format!("plots/{plot_id}/thresholds")).await
    }

    /// Replace the whole threshold object; returns the stored version.
    ///
    /// `PUT plots/{id}/thresholds`
    pub async fn put_plot_thresholds(
        &self,
        plot_id: &str,
        body: &ThresholdsBody,
    ) -> Result<ThresholdsBody, Error> {
        self.put(&format!("plots/{plot_id}/thresholds"), body).await
    }
}
