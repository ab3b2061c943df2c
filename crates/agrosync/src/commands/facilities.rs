//! Facility command handlers.

use tabled::Tabled;

use agrosync_core::{Dashboard, Facility, NewFacility};

use crate::cli::{FacilitiesArgs, FacilitiesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FacilityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Facility> for FacilityRow {
    fn from(f: &Facility) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            location: f.location.clone().unwrap_or_default(),
            created: f
                .created_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: FacilitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FacilitiesCommand::List => {
            let facilities = dashboard.facilities().await?;
            let out = output::render_list(
                &global.output,
                facilities.as_slice(),
                |f| FacilityRow::from(f),
                |f| f.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FacilitiesCommand::Create { name, location } => {
            let created = dashboard
                .create_facility(NewFacility::new(name, location))
                .await?;
            output::success(
                &format!("Facility '{}' created ({})", created.name, created.id),
                global.quiet,
                util::color(global),
            );
            Ok(())
        }
    }
}
