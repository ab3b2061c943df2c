//! Responsibles (alert recipient) command handlers.

use tabled::Tabled;

use agrosync_core::{Dashboard, EmailAddress, FacilityId, ResponsibleSet};

use crate::cli::{GlobalOpts, ResponsiblesArgs, ResponsiblesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ResponsibleRow {
    #[tabled(rename = "Email")]
    email: String,
}

fn print_set(set: &ResponsibleSet, facility_id: &FacilityId, global: &GlobalOpts) {
    if set.is_empty() {
        output::empty_state(
            &format!("No alert recipients for facility {facility_id}"),
            global.quiet,
        );
        return;
    }
    let emails: Vec<&EmailAddress> = set.iter().collect();
    let out = output::render_list(
        &global.output,
        emails.as_slice(),
        |e| ResponsibleRow {
            email: e.to_string(),
        },
        |e| e.to_string(),
    );
    output::print_output(&out, global.quiet);
}

pub async fn handle(
    dashboard: &Dashboard,
    args: ResponsiblesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ResponsiblesCommand::List { facility } => {
            let facility_id = FacilityId::new(facility);
            let set = dashboard.responsibles(&facility_id).await?;
            print_set(&set, &facility_id, global);
            Ok(())
        }

        ResponsiblesCommand::Add { facility, email } => {
            let facility_id = FacilityId::new(facility);
            let editor = dashboard.responsibles_editor(&facility_id).await?;
            let committed = editor.add(&email).await?;
            output::success(
                &format!("{} will receive alerts", email.trim()),
                global.quiet,
                util::color(global),
            );
            print_set(&committed, &facility_id, global);
            Ok(())
        }

        ResponsiblesCommand::Remove { facility, email } => {
            if !util::confirm(
                &format!("Stop sending alerts to {}?", email.trim()),
                "responsibles remove",
                global.yes,
            )? {
                return Ok(());
            }
            let facility_id = FacilityId::new(facility);
            let editor = dashboard.responsibles_editor(&facility_id).await?;
            let committed = editor.remove(&email).await?;
            output::success(
                &format!("{} removed", email.trim()),
                global.quiet,
                util::color(global),
            );
            print_set(&committed, &facility_id, global);
            Ok(())
        }
    }
}
