//! Irrigation command handlers.

use std::fmt::Write as _;

use chrono::Utc;
use tabled::Tabled;

use agrosync_core::{
    Dashboard, FacilityId, FacilityIrrigations, IrrigationEvent, IrrigationSummary, PlotId,
};

use crate::cli::{GlobalOpts, IrrigationArgs, IrrigationCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Plot")]
    plot: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Duration (min)")]
    duration: String,
    #[tabled(rename = "Water (L)")]
    water: String,
}

impl From<&IrrigationEvent> for EventRow {
    fn from(e: &IrrigationEvent) -> Self {
        Self {
            plot: util::or_missing(e.plot_id.as_ref()),
            time: util::or_missing(e.timestamp.map(|t| t.format("%Y-%m-%d %H:%M"))),
            kind: e.kind.to_string(),
            duration: util::or_missing(e.duration),
            water: util::or_missing(e.water_amount.map(|w| format!("{w:.1}"))),
        }
    }
}

fn summary_detail(summary: &IrrigationSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Plot:            {}", summary.plot_id);
    match summary.last {
        Some(ref last) => {
            let _ = writeln!(out, "Last irrigation: {}", util::ago(last.at));
            let _ = writeln!(out, "Type:            {}", last.event.kind);
            if let Some(duration) = last.event.duration {
                let _ = writeln!(out, "Duration:        {duration} min");
            }
            let _ = writeln!(
                out,
                "Last water:      {}",
                util::or_missing(last.event.water_amount.map(|w| format!("{w:.1} L")))
            );
        }
        None => {
            let _ = writeln!(out, "Last irrigation: never");
        }
    }
    let _ = writeln!(out, "Water today:     {:.1} L", summary.water_today);
    let _ = writeln!(out, "Total events:    {}", summary.total_events);
    out.trim_end().to_owned()
}

fn facility_rows(day: &FacilityIrrigations) -> Vec<IrrigationEvent> {
    day.by_plot
        .iter()
        .flat_map(|(plot, events)| {
            events.iter().map(move |e| IrrigationEvent {
                plot_id: e.plot_id.clone().or_else(|| Some(plot.clone())),
                ..e.clone()
            })
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: IrrigationArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        IrrigationCommand::Show { plot } => {
            let plot_id = PlotId::new(plot);
            let summary = dashboard
                .irrigation_summary(&plot_id, Utc::now().date_naive())
                .await?;
            let out = output::render_single(&global.output, &summary, summary_detail, |s| {
                util::ago(s.last.as_ref().and_then(|l| l.at))
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IrrigationCommand::List { plot } => {
            let plot_id = PlotId::new(plot);
            let events = util::empty_on_not_found(dashboard.irrigations(&plot_id).await)?;
            let Some(events) = events.filter(|e| !e.is_empty()) else {
                output::empty_state(
                    &format!("No irrigation recorded for plot {plot_id}"),
                    global.quiet,
                );
                return Ok(());
            };
            let out = output::render_list(
                &global.output,
                events.as_slice(),
                |e| EventRow::from(e),
                |e| util::or_missing(e.timestamp.map(|t| t.to_rfc3339())),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IrrigationCommand::Facility { facility, date } => {
            let facility_id = FacilityId::new(facility);
            let day = dashboard.facility_irrigations(&facility_id, date).await?;
            // Table and plain flatten the per-plot map; structured formats keep it.
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    let rows = facility_rows(&day);
                    output::render_list(
                        &global.output,
                        rows.as_slice(),
                        |e| EventRow::from(e),
                        |e| util::or_missing(e.plot_id.as_ref()),
                    )
                }
                _ => output::render_single(
                    &global.output,
                    day.as_ref(),
                    |_| String::new(),
                    |_| String::new(),
                ),
            };
            output::print_output(&out, global.quiet);
            if matches!(global.output, OutputFormat::Table) && !global.quiet {
                eprintln!(
                    "{}: {} events, {:.1} L",
                    day.date,
                    day.total_events,
                    day.water_total()
                );
            }
            Ok(())
        }
    }
}
