//! CLI configuration: thin wrapper around `agrosync_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --token, etc.).

use secrecy::SecretString;

use agrosync_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use agrosync_config::{
    Config, Defaults, Profile, config_path, delete_token, load_config_or_default,
    profile_to_dashboard_config, save_config, store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Apply flag overrides on top of a profile. Flags win.
fn apply_overrides(profile: &mut Profile, global: &GlobalOpts, defaults: &Defaults) {
    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if global.user_pool_id.is_some() {
        profile.user_pool_id.clone_from(&global.user_pool_id);
    }
    if global.client_id.is_some() {
        profile.client_id.clone_from(&global.client_id);
    }
    if let Some(ref region) = global.region {
        profile.region.clone_from(region);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    profile.timeout = global
        .timeout
        .or(profile.timeout)
        .or(Some(defaults.timeout));
}

/// Build the `DashboardConfig` for a command from the config file, the
/// active profile, and CLI overrides.
///
/// Without a matching profile, `--api-url` alone is enough to run.
pub fn build_dashboard_config(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(p) => p.clone(),
        None => match (&global.api_url, &global.profile) {
            (Some(url), _) => Profile::new(url.clone()),
            (None, Some(_)) => {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }
            (None, None) => {
                return Err(CliError::NoConfig {
                    path: config_path().display().to_string(),
                });
            }
        },
    };
    apply_overrides(&mut profile, global, &cfg.defaults);

    let mut dashboard = profile_to_dashboard_config(&profile, &profile_name)?;
    if let Some(ref token) = global.token {
        dashboard.access_token = Some(SecretString::from(token.clone()));
    }
    tracing::debug!(profile = %profile_name, url = %dashboard.api_url, "resolved config");
    Ok(dashboard)
}
