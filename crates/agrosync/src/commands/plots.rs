//! Plot command handlers.

use std::fmt::Write as _;

use tabled::Tabled;

use agrosync_core::format::format_reading;
use agrosync_core::{Dashboard, FacilityId, NewPlot, Plot, PlotId, PlotState, SensorVariable};

use crate::cli::{GlobalOpts, PlotsArgs, PlotsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

const READINGS: [SensorVariable; 4] = [
    SensorVariable::Temperature,
    SensorVariable::Humidity,
    SensorVariable::SoilMoisture,
    SensorVariable::Light,
];

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PlotRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Area (m²)")]
    area: String,
    #[tabled(rename = "Hardware")]
    mac: String,
}

impl From<&Plot> for PlotRow {
    fn from(p: &Plot) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.display_name(),
            location: p.location.clone().unwrap_or_default(),
            species: p.species.clone().unwrap_or_default(),
            area: p.area.map(|a| format!("{a:.1}")).unwrap_or_default(),
            mac: p.mac_address.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Temperature")]
    temperature: String,
    #[tabled(rename = "Humidity")]
    humidity: String,
    #[tabled(rename = "Soil moisture")]
    soil_moisture: String,
    #[tabled(rename = "Light")]
    light: String,
}

impl From<&PlotState> for ReadingRow {
    fn from(s: &PlotState) -> Self {
        let cell = |v: SensorVariable| format_reading(v, s.reading(v));
        Self {
            time: util::or_missing(s.timestamp.map(|t| t.format("%Y-%m-%d %H:%M"))),
            temperature: cell(SensorVariable::Temperature),
            humidity: cell(SensorVariable::Humidity),
            soil_moisture: cell(SensorVariable::SoilMoisture),
            light: cell(SensorVariable::Light),
        }
    }
}

fn state_detail(state: &PlotState, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Plot:          {}", state.plot_id);
    let _ = writeln!(out, "Updated:       {}", util::ago(state.timestamp));
    for variable in READINGS {
        let value = output::reading(format_reading(variable, state.reading(variable)), color);
        let _ = writeln!(out, "{:<15}{value}", format!("{variable}:"));
    }
    out.trim_end().to_owned()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: PlotsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PlotsCommand::List { facility } => {
            let plots = dashboard.plots(&FacilityId::new(facility)).await?;
            let out = output::render_list(
                &global.output,
                plots.as_slice(),
                |p| PlotRow::from(p),
                |p| p.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PlotsCommand::Create {
            facility,
            name,
            location,
            mac_address,
            species,
            area,
        } => {
            let created = dashboard
                .create_plot(NewPlot {
                    facility_id: FacilityId::new(facility),
                    name,
                    location,
                    mac_address,
                    species,
                    area,
                })
                .await?;
            let color = util::color(global);
            if let Some(ref species) = created.new_species {
                output::success(
                    &format!("Species '{}' registered", species.name),
                    global.quiet,
                    color,
                );
            }
            output::success(
                &format!(
                    "Plot '{}' created ({})",
                    created.plot.display_name(),
                    created.plot.id
                ),
                global.quiet,
                color,
            );
            Ok(())
        }

        PlotsCommand::State { plot } => {
            let plot_id = PlotId::new(plot);
            let Some(state) = dashboard.plot_state(&plot_id).await? else {
                output::empty_state(
                    &format!("No sensor data yet for plot {plot_id}"),
                    global.quiet,
                );
                return Ok(());
            };
            let color = util::color(global);
            let out = output::render_single(
                &global.output,
                state.as_ref(),
                |s| state_detail(s, color),
                |s| util::ago(s.timestamp),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PlotsCommand::History { plot } => {
            let plot_id = PlotId::new(plot);
            let history = util::empty_on_not_found(dashboard.plot_history(&plot_id).await)?;
            let Some(history) = history.filter(|h| !h.is_empty()) else {
                output::empty_state(
                    &format!("No sensor history yet for plot {plot_id}"),
                    global.quiet,
                );
                return Ok(());
            };
            let out = output::render_list(
                &global.output,
                history.as_slice(),
                |s| ReadingRow::from(s),
                |s| util::or_missing(s.timestamp.map(|t| t.to_rfc3339())),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
