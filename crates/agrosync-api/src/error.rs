use thiserror::Error;

/// Top-level error type for the `agrosync-api` crate.
///
/// Every failure an endpoint can produce. [`Error::kind`] folds them into
/// the four outcomes callers act on; `agrosync-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── HTTP status classes ─────────────────────────────────────────
    /// HTTP 404: the resource has no data yet.
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// HTTP 401/403: the session token was rejected.
    #[error("Unauthorized (HTTP {status}) -- re-authentication required")]
    Unauthorized { status: u16 },

    /// A 4xx rejection of the request payload (400, 409, 422, ...).
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// HTTP 429.
    #[error("Rate limited by the API (HTTP 429)")]
    RateLimited,

    /// HTTP 5xx.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Access token could not be turned into a header value.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// The four outcomes an endpoint call can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No data yet. A normal state, never a fault.
    NotFound,
    /// Payload rejected.
    Validation,
    /// Session expired or invalid.
    Unauthorized,
    /// Network or server fault; eligible for a single retry.
    Transient,
}

impl Error {
    /// Classify this error into one of the four outcomes.
    ///
    /// Client construction problems (`InvalidUrl`, `Tls`, `InvalidToken`)
    /// are caller mistakes and classify as `Validation`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Rejected { .. } | Self::InvalidUrl(_) | Self::Tls(_) | Self::InvalidToken(_) => {
                ErrorKind::Validation
            }
            Self::RateLimited | Self::Server { .. } | Self::Deserialization { .. } => {
                ErrorKind::Transient
            }
            Self::Transport(e) => classify_transport(e),
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Returns `true` if the session must be re-established.
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    /// HTTP status code, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::RateLimited => Some(429),
            Self::Unauthorized { status }
            | Self::Rejected { status, .. }
            | Self::Server { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn classify_transport(e: &reqwest::Error) -> ErrorKind {
    match e.status().map(|s| s.as_u16()) {
        Some(404) => ErrorKind::NotFound,
        Some(401 | 403) => ErrorKind::Unauthorized,
        Some(s) if (400..500).contains(&s) && s != 429 => ErrorKind::Validation,
        _ => ErrorKind::Transient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes_map_to_kinds() {
        assert_eq!(Error::NotFound { path: "/x".into() }.kind(), ErrorKind::NotFound);
        assert_eq!(Error::Unauthorized { status: 403 }.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            Error::Rejected { status: 422, message: "bad".into() }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::RateLimited.kind(), ErrorKind::Transient);
        assert_eq!(
            Error::Server { status: 503, message: "down".into() }.kind(),
            ErrorKind::Transient
        );
    }

    #[test]
    fn malformed_body_is_transient() {
        let err = Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        };
        assert!(err.is_transient());
        assert_eq!(err.status(), None);
    }
}
