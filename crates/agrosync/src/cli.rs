//! Clap derive structures for the `agrosync` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use agrosync_core::Bounds;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// agrosync -- monitor irrigation plots from the command line
#[derive(Debug, Parser)]
#[command(
    name = "agrosync",
    version,
    about = "Monitor agrosync facilities, plots and irrigation",
    long_about = "Command-line dashboard for the agrosync IoT agriculture backend.\n\n\
        Lists facilities and plots, shows live sensor readings and irrigation\n\
        history, and edits alert thresholds and alert recipients.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "AGROSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend API URL (overrides profile)
    #[arg(long, short = 'u', env = "AGROSYNC_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Access token issued by the identity provider
    #[arg(long, env = "AGROSYNC_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Identity provider user pool id (overrides profile)
    #[arg(long, env = "AGROSYNC_USER_POOL_ID", global = true)]
    pub user_pool_id: Option<String>,

    /// Identity provider client id (overrides profile)
    #[arg(long, env = "AGROSYNC_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// Identity provider region (overrides profile)
    #[arg(long, env = "AGROSYNC_REGION", global = true)]
    pub region: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "AGROSYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates (local backends only)
    #[arg(long, short = 'k', env = "AGROSYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "AGROSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage facilities
    #[command(alias = "fac", alias = "f")]
    Facilities(FacilitiesArgs),

    /// Manage plots and view their sensor readings
    #[command(alias = "p")]
    Plots(PlotsArgs),

    /// View irrigation events
    #[command(alias = "irr")]
    Irrigation(IrrigationArgs),

    /// Manage crop species
    Species(SpeciesArgs),

    /// View and edit a plot's alert thresholds
    #[command(alias = "th")]
    Thresholds(ThresholdsArgs),

    /// Manage a facility's alert recipients
    #[command(alias = "resp")]
    Responsibles(ResponsiblesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Remove the stored access token for the active profile
    Logout,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FACILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FacilitiesArgs {
    #[command(subcommand)]
    pub command: FacilitiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FacilitiesCommand {
    /// List facilities
    #[command(alias = "ls")]
    List,

    /// Create a facility
    Create {
        /// Facility name
        #[arg(long, required = true)]
        name: String,

        /// Where the facility is
        #[arg(long, required = true)]
        location: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PLOTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PlotsArgs {
    #[command(subcommand)]
    pub command: PlotsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PlotsCommand {
    /// List the plots of a facility
    #[command(alias = "ls")]
    List {
        /// Facility ID
        facility: String,
    },

    /// Create a plot. An unknown species is registered first.
    Create {
        /// Facility ID
        #[arg(long, required = true)]
        facility: String,

        /// Plot name
        #[arg(long, required = true)]
        name: String,

        /// Location inside the facility
        #[arg(long, required = true)]
        location: String,

        /// Hardware address of the sensor board
        #[arg(long = "mac", required = true)]
        mac_address: String,

        /// Species grown on the plot
        #[arg(long)]
        species: Option<String>,

        /// Area in square meters
        #[arg(long)]
        area: Option<f64>,
    },

    /// Show the latest sensor readings
    State {
        /// Plot ID
        plot: String,
    },

    /// Show past sensor readings
    History {
        /// Plot ID
        plot: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  IRRIGATION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct IrrigationArgs {
    #[command(subcommand)]
    pub command: IrrigationCommand,
}

#[derive(Debug, Subcommand)]
pub enum IrrigationCommand {
    /// Summarize a plot's irrigation: last event and today's water
    Show {
        /// Plot ID
        plot: String,
    },

    /// List a plot's irrigation events
    #[command(alias = "ls")]
    List {
        /// Plot ID
        plot: String,
    },

    /// List a facility's irrigation events for one day
    Facility {
        /// Facility ID
        facility: String,

        /// Day to show (YYYY-MM-DD). Defaults to today on the backend.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SPECIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SpeciesArgs {
    #[command(subcommand)]
    pub command: SpeciesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SpeciesCommand {
    /// List registered species
    #[command(alias = "ls")]
    List,

    /// Register a species
    Create {
        /// Species name
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  THRESHOLDS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ThresholdsArgs {
    #[command(subcommand)]
    pub command: ThresholdsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThresholdsCommand {
    /// Show a plot's alert thresholds
    Show {
        /// Plot ID
        plot: String,
    },

    /// Edit thresholds. Unnamed variables keep their current range.
    Set {
        /// Plot ID
        plot: String,

        /// Species the ranges are tuned for
        #[arg(long)]
        species: Option<String>,

        /// Temperature range, MIN:MAX (either side may be empty)
        #[arg(long, value_name = "MIN:MAX")]
        temperature: Option<BoundsArg>,

        /// Humidity range, MIN:MAX
        #[arg(long, value_name = "MIN:MAX")]
        humidity: Option<BoundsArg>,

        /// Light range, MIN:MAX
        #[arg(long, value_name = "MIN:MAX")]
        light: Option<BoundsArg>,

        /// Irrigation range in mm/day, MIN:MAX
        #[arg(long, value_name = "MIN:MAX")]
        irrigation: Option<BoundsArg>,
    },

    /// Switch alerting on or off
    Toggle {
        /// Plot ID
        plot: String,
    },
}

/// A `MIN:MAX` range argument. `18:` and `:30` leave one side open, `:`
/// clears both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsArg(pub Bounds);

impl FromStr for BoundsArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s
            .split_once(':')
            .ok_or_else(|| format!("expected MIN:MAX, got '{s}'"))?;
        let side = |raw: &str| -> Result<Option<f64>, String> {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<f64>()
                .map(Some)
                .map_err(|_| format!("'{raw}' is not a number"))
        };
        Ok(Self(Bounds::new(side(min)?, side(max)?)))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESPONSIBLES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ResponsiblesArgs {
    #[command(subcommand)]
    pub command: ResponsiblesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResponsiblesCommand {
    /// List alert recipients
    #[command(alias = "ls")]
    List {
        /// Facility ID
        facility: String,
    },

    /// Add an alert recipient
    Add {
        /// Facility ID
        facility: String,

        /// Email address
        email: String,
    },

    /// Remove an alert recipient
    #[command(alias = "rm")]
    Remove {
        /// Facility ID
        facility: String,

        /// Email address
        email: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Validate the active profile without contacting the backend
    Check,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an access token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bounds_arg_accepts_open_sides() {
        let b: BoundsArg = "18:30".parse().expect("closed");
        assert_eq!(b.0, Bounds::new(Some(18.0), Some(30.0)));
        let b: BoundsArg = ":30".parse().expect("open min");
        assert_eq!(b.0, Bounds::new(None, Some(30.0)));
        let b: BoundsArg = ":".parse().expect("cleared");
        assert_eq!(b.0, Bounds::default());
    }

    #[test]
    fn bounds_arg_rejects_garbage() {
        assert!("18".parse::<BoundsArg>().is_err());
        assert!("a:30".parse::<BoundsArg>().is_err());
    }
}
