//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use agrosync_config::ConfigError;
use agrosync_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(agrosync::transient),
        help(
            "The request was already retried once.\n\
             Check that the backend is reachable and try again.\n\
             Current settings: agrosync config show"
        )
    )]
    Transient { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Session is not valid: {message}")]
    #[diagnostic(
        code(agrosync::auth_failed),
        help(
            "Sign in again and store the fresh token with:\n\
             agrosync config set-token"
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("No data yet for {resource}")]
    #[diagnostic(
        code(agrosync::not_found),
        help("The resource exists but has not reported anything, or the ID is wrong.")
    )]
    NotFound { resource: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(agrosync::rejected))]
    Rejected { message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(agrosync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Identity provider settings missing: {keys}")]
    #[diagnostic(
        code(agrosync::missing_identity),
        help(
            "Add them to the profile (agrosync config init) or set\n\
             AGROSYNC_USER_POOL_ID and AGROSYNC_CLIENT_ID."
        )
    )]
    MissingIdentity { keys: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(agrosync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: agrosync config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(agrosync::no_config),
        help(
            "Create one with: agrosync config init\n\
             Expected at: {path}\n\
             Or pass --api-url for a one-off command."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(agrosync::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(agrosync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("Internal error: {message}")]
    #[diagnostic(code(agrosync::internal))]
    Internal { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Transient { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. }
            | Self::Validation { .. }
            | Self::MissingIdentity { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { resource } => CliError::NotFound { resource },
            CoreError::ValidationFailed { message } => CliError::Rejected { message },
            CoreError::Unauthorized { message } => CliError::AuthFailed { message },
            CoreError::Transient { .. } => CliError::Transient {
                message: err.to_string(),
            },
            CoreError::InvalidTransition { .. } => CliError::Rejected {
                message: err.to_string(),
            },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(see: agrosync config profiles)".into(),
            },
            ConfigError::MissingIdentity { keys, .. } => CliError::MissingIdentity {
                keys: keys.join(", "),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
