// ── Core error types ──
//
// User-facing errors from agrosync-core. Consumers never see HTTP status
// codes or JSON parse failures directly; `From<agrosync_api::Error>`
// folds transport errors into the four outcomes the dashboard acts on.
//
// `CoreError` is `Clone` because one fetch result is shared between every
// coalesced reader of a query key.

use agrosync_api::ErrorKind;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Remote outcomes ──────────────────────────────────────────────
    /// The resource has no data yet. Rendered as an empty state.
    #[error("No data yet: {resource}")]
    NotFound { resource: String },

    /// The payload was rejected, locally or by the backend.
    #[error("{message}")]
    ValidationFailed { message: String },

    /// The session is missing, expired or was rejected.
    #[error("Session expired: {message}")]
    Unauthorized { message: String },

    /// Network or server fault that survived the automatic retry.
    #[error("Temporary failure: {message}")]
    Transient {
        message: String,
        /// HTTP status code (if the failure came from a response).
        status: Option<u16>,
    },

    // ── Local state machine ──────────────────────────────────────────
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// How a failed operation should be shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPresentation {
    /// Show an empty "no data yet" state, not an error.
    EmptyState,
    /// Show the message next to the input that caused it.
    Inline(String),
    /// Drop the session and ask for a fresh sign-in.
    Reauthenticate,
    /// Show a banner offering a manual retry.
    RetryBanner(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// The remote outcome class, if this error came from (or stands in
    /// for) a backend response.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::NotFound { .. } => Some(ErrorKind::NotFound),
            Self::ValidationFailed { .. } => Some(ErrorKind::Validation),
            Self::Unauthorized { .. } => Some(ErrorKind::Unauthorized),
            Self::Transient { .. } => Some(ErrorKind::Transient),
            Self::InvalidTransition { .. } | Self::Config { .. } | Self::Internal(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn presentation(&self) -> ErrorPresentation {
        match self {
            Self::NotFound { .. } => ErrorPresentation::EmptyState,
            Self::Unauthorized { .. } => ErrorPresentation::Reauthenticate,
            Self::Transient { .. } | Self::Internal(_) => {
                ErrorPresentation::RetryBanner(self.to_string())
            }
            Self::ValidationFailed { .. }
            | Self::InvalidTransition { .. }
            | Self::Config { .. } => ErrorPresentation::Inline(self.to_string()),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<agrosync_api::Error> for CoreError {
    fn from(err: agrosync_api::Error) -> Self {
        use agrosync_api::Error as Api;

        match err {
            Api::NotFound { path } => CoreError::NotFound { resource: path },
            Api::Rejected { message, .. } => CoreError::ValidationFailed { message },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            Api::InvalidToken(msg) => CoreError::Config {
                message: format!("Invalid access token: {msg}"),
            },
            other => {
                let status = other.status();
                let message = other.to_string();
                match other.kind() {
                    ErrorKind::NotFound => CoreError::NotFound { resource: message },
                    ErrorKind::Unauthorized => CoreError::Unauthorized { message },
                    ErrorKind::Validation => CoreError::ValidationFailed { message },
                    ErrorKind::Transient => CoreError::Transient { message, status },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_their_outcome() {
        let nf: CoreError = agrosync_api::Error::NotFound {
            path: "/plots/p-1/state".into(),
        }
        .into();
        assert!(nf.is_not_found());
        assert_eq!(nf.presentation(), ErrorPresentation::EmptyState);

        let server: CoreError = agrosync_api::Error::Server {
            status: 502,
            message: "bad gateway".into(),
        }
        .into();
        assert!(matches!(server, CoreError::Transient { status: Some(502), .. }));

        let auth: CoreError = agrosync_api::Error::Unauthorized { status: 401 }.into();
        assert_eq!(auth.presentation(), ErrorPresentation::Reauthenticate);
    }

    #[test]
    fn rejection_detail_is_the_inline_message() {
        let err: CoreError = agrosync_api::Error::Rejected {
            status: 422,
            message: "MinTemperature must be a number".into(),
        }
        .into();
        assert_eq!(
            err.presentation(),
            ErrorPresentation::Inline("MinTemperature must be a number".into())
        );
    }

    #[test]
    fn transitions_have_no_remote_kind() {
        let err = CoreError::InvalidTransition {
            action: "save",
            state: "viewing",
        };
        assert_eq!(err.kind(), None);
        assert_eq!(err.to_string(), "Cannot save while viewing");
    }
}
