//! Species command handlers.

use tabled::Tabled;

use agrosync_core::{Dashboard, Species};

use crate::cli::{GlobalOpts, SpeciesArgs, SpeciesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SpeciesRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Species> for SpeciesRow {
    fn from(s: &Species) -> Self {
        Self {
            name: s.name.clone(),
            id: s.id.as_ref().map(ToString::to_string).unwrap_or_default(),
        }
    }
}

pub async fn handle(
    dashboard: &Dashboard,
    args: SpeciesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SpeciesCommand::List => {
            let species = dashboard.species().await?;
            let out = output::render_list(
                &global.output,
                species.as_slice(),
                |s| SpeciesRow::from(s),
                |s| s.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SpeciesCommand::Create { name } => {
            let created = dashboard.create_species(&name).await?;
            output::success(
                &format!("Species '{}' registered", created.name),
                global.quiet,
                util::color(global),
            );
            Ok(())
        }
    }
}
