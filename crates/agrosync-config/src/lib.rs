//! Shared configuration for agrosync tools.
//!
//! TOML profiles, access-token resolution (env + keyring + plaintext),
//! and translation to `agrosync_core::DashboardConfig`. The CLI layers its
//! flag overrides on top of what this crate resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use agrosync_core::{DashboardConfig, IdentityProviderConfig, QueryPolicy, TlsVerification};

const KEYRING_SERVICE: &str = "agrosync";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("identity provider settings missing for profile '{profile}': {}", keys.join(", "))]
    MissingIdentity {
        profile: String,
        keys: Vec<&'static str>,
    },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Pick a profile by name, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
            .to_owned();
        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile)),
            None => Err(ConfigError::UnknownProfile { name }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "https://api.example.com/v1/").
    pub api_url: String,

    /// Identity provider user pool.
    pub user_pool_id: Option<String>,

    /// Identity provider app client.
    pub client_id: Option<String>,

    #[serde(default = "default_region")]
    pub region: String,

    /// Access token (plaintext, prefer keyring or env var).
    pub access_token: Option<String>,

    /// Environment variable name containing the access token.
    pub access_token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// How long a cached read stays fresh, in seconds.
    pub stale_time: Option<u64>,

    /// Automatic retries after a transient failure.
    pub retries: Option<u32>,
}

fn default_region() -> String {
    "us-east-1".into()
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            user_pool_id: None,
            client_id: None,
            region: default_region(),
            access_token: None,
            access_token_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            stale_time: None,
            retries: None,
        }
    }

    pub fn identity(&self) -> IdentityProviderConfig {
        IdentityProviderConfig {
            user_pool_id: self.user_pool_id.clone(),
            client_id: self.client_id.clone(),
            region: self.region.clone(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "agrosync", "agrosync").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("agrosync");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. `AGROSYNC_` variables override it, with
/// `__` separating nested keys (`AGROSYNC_PROFILES__FARM__REGION`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("AGROSYNC_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Access token ────────────────────────────────────────────────────

fn token_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/access-token"),
    )?)
}

/// Resolve the access token: `access_token_env`, then the system keyring,
/// then the plaintext profile value. `None` when no source has one.
pub fn resolve_access_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's access_token_env → env var lookup
    if let Some(val) = profile
        .access_token_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
        .filter(|v| !v.is_empty())
    {
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if let Ok(secret) =
        token_entry(profile_name).and_then(|e| e.get_password().map_err(ConfigError::from))
    {
        return Some(SecretString::from(secret));
    }

    // 3. Plaintext in config
    profile
        .access_token
        .clone()
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    token_entry(profile_name)?.set_password(token)?;
    Ok(())
}

/// Remove the keyring token. `Ok(false)` when there was none.
pub fn delete_token(profile_name: &str) -> Result<bool, ConfigError> {
    match token_entry(profile_name)?.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `DashboardConfig` from a profile, with no CLI overrides.
///
/// Identity provider settings are checked here so that every missing key
/// is reported before anything touches the network.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<DashboardConfig, ConfigError> {
    let api_url: url::Url = profile
        .api_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", profile.api_url),
        })?;

    let identity = profile.identity();
    let missing = identity.missing_keys();
    if !missing.is_empty() {
        return Err(ConfigError::MissingIdentity {
            profile: profile_name.into(),
            keys: missing,
        });
    }

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let defaults = QueryPolicy::default();
    let query = QueryPolicy {
        stale_time: profile
            .stale_time
            .map_or(defaults.stale_time, Duration::from_secs),
        retries: profile.retries.unwrap_or(defaults.retries),
        ..defaults
    };

    Ok(DashboardConfig {
        api_url,
        access_token: resolve_access_token(profile, profile_name),
        tls,
        timeout: profile.timeout.map(Duration::from_secs),
        identity,
        query,
    })
}
