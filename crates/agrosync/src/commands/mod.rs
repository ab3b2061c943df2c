//! Command dispatch: bridges CLI args -> `Dashboard` calls -> output formatting.

pub mod config_cmd;
pub mod facilities;
pub mod irrigation;
pub mod plots;
pub mod responsibles;
pub mod species;
pub mod thresholds;
pub mod util;

use agrosync_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Facilities(args) => facilities::handle(dashboard, args, global).await,
        Command::Plots(args) => plots::handle(dashboard, args, global).await,
        Command::Irrigation(args) => irrigation::handle(dashboard, args, global).await,
        Command::Species(args) => species::handle(dashboard, args, global).await,
        Command::Thresholds(args) => thresholds::handle(dashboard, args, global).await,
        Command::Responsibles(args) => responsibles::handle(dashboard, args, global).await,
        // Handled before a dashboard is built
        Command::Config(_) | Command::Logout | Command::Completions(_) => Err(CliError::Internal {
            message: "local command reached backend dispatch".into(),
        }),
    }
}
