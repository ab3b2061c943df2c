//! Shared helpers for command handlers.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};

use agrosync_core::CoreError;
use agrosync_core::format::{MISSING, time_since};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

pub fn color(global: &GlobalOpts) -> bool {
    output::should_color(&global.color)
}

/// "3h 12m ago" relative to now, or the missing marker.
pub fn ago(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| MISSING.to_owned(), |t| time_since(t, Utc::now()))
}

pub fn or_missing<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING.to_owned(), |v| v.to_string())
}

/// Treat "no data yet" as an empty result rather than a failure.
pub fn empty_on_not_found<T>(result: Result<T, CoreError>) -> Result<Option<T>, CoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CoreError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
