// Hand-crafted async HTTP client for the agrosync backend.
//
// Wraps `reqwest::Client` with base-URL joining and status classification.
// Endpoint methods live in the per-resource modules (facilities, plots,
// ...) as inherent impls to keep this file focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::ErrorBody;

/// Async client for the agrosync REST API.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL and transport config.
    ///
    /// The base URL may or may not end in `/`; endpoint paths are always
    /// joined relative to it (e.g. `https://api.example.com/v1/` +
    /// `facilities`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The API base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"facilities/abc/plots"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            let path = resp.url().path().to_owned();
            Err(Self::parse_error(status, path, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, path: String, resp: reqwest::Response) -> Error {
        let code = status.as_u16();
        match code {
            404 => return Error::NotFound { path },
            401 | 403 => return Error::Unauthorized { status: code },
            429 => return Error::RateLimited,
            _ => {}
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = detail_message(&raw).unwrap_or_else(|| {
            if raw.is_empty() {
                status.to_string()
            } else {
                raw
            }
        });

        if status.is_server_error() {
            Error::Server {
                status: code,
                message,
            }
        } else {
            Error::Rejected {
                status: code,
                message,
            }
        }
    }
}

/// Extract the `detail` message from an error body.
///
/// The backend sends either a plain string or a list of validation
/// objects with a `msg` field.
fn detail_message(raw: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(raw).ok()?;
    match body.detail? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(items) => {
            let msgs: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()).map(str::to_owned))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = ApiClient::from_reqwest("https://api.example.com/v1", reqwest::Client::new())
            .expect("valid url");
        assert_eq!(client.base_url().as_str(), "https://api.example.com/v1/");
        assert_eq!(
            client.url("facilities").expect("join").as_str(),
            "https://api.example.com/v1/facilities"
        );
    }

    #[test]
    fn detail_message_handles_string_and_list() {
        assert_eq!(
            detail_message(r#"{"detail":"Facility not found"}"#).as_deref(),
            Some("Facility not found")
        );
        assert_eq!(
            detail_message(r#"{"detail":[{"msg":"field required"},{"msg":"bad mac"}]}"#)
                .as_deref(),
            Some("field required; bad mac")
        );
        assert_eq!(detail_message("not json"), None);
    }
}
