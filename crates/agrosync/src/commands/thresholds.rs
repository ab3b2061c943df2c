//! Threshold command handlers.

use std::fmt::Write as _;

use tabled::Tabled;

use agrosync_core::{Bounds, Dashboard, MonitoredVariable, PlotId, SpeciesThresholds};

use crate::cli::{BoundsArg, GlobalOpts, ThresholdsArgs, ThresholdsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RangeRow {
    #[tabled(rename = "Variable")]
    variable: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Unit")]
    unit: &'static str,
}

fn range_rows(t: &SpeciesThresholds) -> Vec<RangeRow> {
    t.visible()
        .map(|(variable, bounds)| RangeRow {
            variable: variable.to_string(),
            min: util::or_missing(bounds.min),
            max: util::or_missing(bounds.max),
            unit: variable.unit(),
        })
        .collect()
}

fn thresholds_detail(t: &SpeciesThresholds, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Species:  {}", t.species_id);
    let _ = writeln!(out, "Alerts:   {}", output::alert_badge(t.enabled, color));
    let rows = range_rows(t);
    if rows.is_empty() {
        let _ = writeln!(out, "No ranges configured");
    } else {
        let _ = writeln!(out, "{}", output::render_table(&rows));
    }
    out.trim_end().to_owned()
}

fn print_thresholds(t: &SpeciesThresholds, global: &GlobalOpts) {
    let color = util::color(global);
    let out = output::render_single(
        &global.output,
        t,
        |t| thresholds_detail(t, color),
        |t| if t.enabled { "on".into() } else { "off".into() },
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: ThresholdsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ThresholdsCommand::Show { plot } => {
            let plot_id = PlotId::new(plot);
            match dashboard.thresholds(&plot_id).await? {
                Some(t) => print_thresholds(&t, global),
                None => output::empty_state(
                    &format!("No thresholds configured for plot {plot_id}"),
                    global.quiet,
                ),
            }
            Ok(())
        }

        ThresholdsCommand::Set {
            plot,
            species,
            temperature,
            humidity,
            light,
            irrigation,
        } => {
            let ranges: Vec<(MonitoredVariable, Bounds)> = [
                (MonitoredVariable::Temperature, temperature),
                (MonitoredVariable::Humidity, humidity),
                (MonitoredVariable::Light, light),
                (MonitoredVariable::Irrigation, irrigation),
            ]
            .into_iter()
            .filter_map(|(v, arg)| arg.map(|BoundsArg(b)| (v, b)))
            .collect();
            if species.is_none() && ranges.is_empty() {
                return Err(CliError::Validation {
                    field: "thresholds".into(),
                    reason: "nothing to change; pass --species or a range".into(),
                });
            }

            let editor = dashboard.threshold_editor(&PlotId::new(plot)).await?;
            editor.begin_edit().await?;
            if let Some(ref species) = species {
                editor.set_species(species).await?;
            }
            for (variable, bounds) in ranges {
                editor.set_bounds(variable, bounds).await?;
            }
            let saved = editor.save().await?;

            output::success("Thresholds saved", global.quiet, util::color(global));
            print_thresholds(&saved, global);
            Ok(())
        }

        ThresholdsCommand::Toggle { plot } => {
            let editor = dashboard.threshold_editor(&PlotId::new(plot)).await?;
            let updated = editor.toggle_enabled().await?;
            let state = if updated.enabled { "enabled" } else { "disabled" };
            output::success(
                &format!("Alerts {state} for plot {}", editor.plot_id()),
                global.quiet,
                util::color(global),
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmonitored_variables_are_not_listed() {
        let t = SpeciesThresholds {
            species_id: "tomato".into(),
            temperature: Bounds::new(Some(18.0), Some(30.0)),
            light: Bounds::new(None, Some(50_000.0)),
            ..SpeciesThresholds::default()
        };
        let rows = range_rows(&t);
        let names: Vec<_> = rows.iter().map(|r| r.variable.as_str()).collect();
        assert_eq!(names, ["Temperature", "Light"]);
        assert_eq!(rows[1].min, "--");
    }
}
