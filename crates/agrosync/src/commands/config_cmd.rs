//! Config subcommand handlers and `logout`.
//!
//! None of these contact the backend.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        for (key, value) in [("user_pool_id", &p.user_pool_id), ("client_id", &p.client_id)] {
            if let Some(v) = value {
                let _ = writeln!(out, "{key} = \"{v}\"");
            }
        }
        let _ = writeln!(out, "region = \"{}\"", p.region);
        if p.access_token.is_some() {
            let _ = writeln!(out, "access_token = \"****\"");
        }
        if let Some(ref env) = p.access_token_env {
            let _ = writeln!(out, "access_token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        for (key, value) in [("timeout", p.timeout), ("stale_time", p.stale_time)] {
            if let Some(v) = value {
                let _ = writeln!(out, "{key} = {v}");
            }
        }
        if let Some(retries) = p.retries {
            let _ = writeln!(out, "retries = {retries}");
        }
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_required(label: &str, default: Option<&str>) -> Result<String, CliError> {
    let mut input = Input::<String>::new().with_prompt(label);
    if let Some(d) = default {
        input = input.default(d.to_owned());
    }
    let value = input.interact_text().map_err(prompt_err)?;
    let value = value.trim().to_owned();
    if value.is_empty() {
        return Err(CliError::Validation {
            field: label.to_lowercase(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(value)
}

fn profile_or_err<'a>(cfg: &'a Config, name: &str) -> Result<&'a Profile, CliError> {
    cfg.profiles
        .get(name)
        .ok_or_else(|| CliError::ProfileNotFound {
            name: name.into(),
            available: config::available_profiles(cfg),
        })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            for profile in cfg.profiles.values_mut() {
                if profile.access_token.is_some() {
                    profile.access_token = Some("****".into());
                }
            }
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Check ───────────────────────────────────────────────────
        ConfigCommand::Check => {
            let dashboard = config::build_dashboard_config(global)?;
            let color = util::color(global);
            output::success(
                &format!("API URL: {}", dashboard.api_url),
                global.quiet,
                color,
            );
            output::success(
                &format!(
                    "Identity provider: pool {} / client {} ({})",
                    dashboard.identity.user_pool_id.as_deref().unwrap_or_default(),
                    dashboard.identity.client_id.as_deref().unwrap_or_default(),
                    dashboard.identity.region
                ),
                global.quiet,
                color,
            );
            if dashboard.access_token.is_none() {
                return Err(CliError::AuthFailed {
                    message: "no access token configured".into(),
                });
            }
            output::success("Access token found", global.quiet, color);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: agrosync config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            profile_or_err(&cfg, &name)?;
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::success(
                &format!("Default profile set to '{name}'"),
                global.quiet,
                util::color(global),
            );
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            profile_or_err(&cfg, &profile_name)?;

            let token = rpassword::prompt_password("Access token: ").map_err(prompt_err)?;
            if token.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "access_token".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            config::store_token(&profile_name, token.trim())?;
            output::success(
                &format!("Access token stored in system keyring for profile '{profile_name}'"),
                global.quiet,
                util::color(global),
            );
            Ok(())
        }
    }
}

/// Interactive wizard writing a fresh profile.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("agrosync configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name = prompt_required("Profile name", Some("default"))?;
    let api_url = prompt_required("API URL", None)?;
    let user_pool_id = prompt_required("Identity provider user pool id", None)?;
    let client_id = prompt_required("Identity provider client id", None)?;
    let region = prompt_required("Identity provider region", Some("us-east-1"))?;

    let mut profile = Profile::new(api_url);
    profile.user_pool_id = Some(user_pool_id);
    profile.client_id = Some(client_id);
    profile.region = region;

    let choices = &[
        "Store a token in the system keyring (recommended)",
        "Read it from an environment variable",
        "Save it to the config file (plaintext)",
        "Skip for now",
    ];
    let selection = Select::new()
        .with_prompt("Access token")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    match selection {
        0 => {
            let token = rpassword::prompt_password("Access token: ").map_err(prompt_err)?;
            config::store_token(&profile_name, token.trim())?;
            eprintln!("   ✓ Token stored in system keyring");
        }
        1 => {
            profile.access_token_env = Some(prompt_required(
                "Variable name",
                Some("AGROSYNC_ACCESS_TOKEN"),
            )?);
        }
        2 => {
            let token = rpassword::prompt_password("Access token: ").map_err(prompt_err)?;
            profile.access_token = Some(token.trim().to_owned());
        }
        _ => {}
    }

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    let path = config::save_config(&cfg)?;

    output::success(
        &format!("Configuration written to {}", path.display()),
        global.quiet,
        util::color(global),
    );
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: agrosync config check");
    Ok(())
}

/// Forget the keyring token of the active profile.
pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    let color = util::color(global);
    if config::delete_token(&profile_name)? {
        output::success(
            &format!("Logged out of profile '{profile_name}'"),
            global.quiet,
            color,
        );
    } else {
        output::empty_state(
            &format!("No stored token for profile '{profile_name}'"),
            global.quiet,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacted_config_masks_plaintext_token() {
        let mut cfg = Config::default();
        let mut profile = Profile::new("https://api.example.com/");
        profile.access_token = Some("secret-value".into());
        profile.client_id = Some("client-1".into());
        cfg.profiles.insert("farm".into(), profile);

        let text = format_config_redacted(&cfg);
        assert!(text.contains("access_token = \"****\""), "{text}");
        assert!(text.contains("client_id = \"client-1\""), "{text}");
        assert!(!text.contains("secret-value"));
    }
}
