//! Snapshot KPIs for the dashboard tiles and post-hoc KPIs over a series.

use std::fmt;

use serde::Serialize;

use super::format::{format_kw, format_kwh};
use super::integrator::step_hours;
use super::types::SimulationState;

/// Direction of the grid exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridDirection {
    Import,
    Export,
    Neutral,
}

impl GridDirection {
    pub fn from_grid_kw(grid_kw: f64) -> Self {
        if grid_kw > 0.0 {
            Self::Import
        } else if grid_kw < 0.0 {
            Self::Export
        } else {
            Self::Neutral
        }
    }
}

/// EV operating mode as shown on its tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvMode {
    Charging,
    V2x,
}

/// Battery operating mode as shown on its tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryMode {
    Charging,
    Discharging,
}

/// Per-tile values derived from a single sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    /// PV generation (kW).
    pub pv_kw: f64,
    /// Cumulative PV energy (kWh).
    pub pv_energy_kwh: f64,
    /// Heat-pump draw (kW).
    pub heat_pump_kw: f64,
    /// Magnitude of the grid exchange (kW).
    pub grid_kw: f64,
    pub grid_direction: GridDirection,
    /// Import counter for import/neutral, export counter for export (kWh).
    pub grid_energy_kwh: f64,
    /// Magnitude of the EV power (kW).
    pub ev_kw: f64,
    pub ev_mode: EvMode,
    /// Charge counter while charging, discharge counter during V2X (kWh).
    pub ev_energy_kwh: f64,
    pub battery_mode: BatteryMode,
    pub battery_soc: f64,
}

impl KpiSummary {
    /// Derives the tile values from `state`.
    pub fn from_state(state: &SimulationState) -> Self {
        let grid_direction = GridDirection::from_grid_kw(state.grid);
        let grid_energy_kwh = match grid_direction {
            GridDirection::Export => state.grid_export_energy,
            GridDirection::Import | GridDirection::Neutral => state.grid_import_energy,
        };
        let (ev_mode, ev_energy_kwh) = if state.ev_power >= 0.0 {
            (EvMode::Charging, state.ev_charge_energy)
        } else {
            (EvMode::V2x, state.ev_discharge_energy)
        };
        let battery_mode = if state.battery_power >= 0.0 {
            BatteryMode::Charging
        } else {
            BatteryMode::Discharging
        };

        Self {
            pv_kw: state.pv,
            pv_energy_kwh: state.pv_energy,
            heat_pump_kw: state.heat_pump,
            grid_kw: state.grid.abs(),
            grid_direction,
            grid_energy_kwh,
            ev_kw: state.ev_power.abs(),
            ev_mode,
            ev_energy_kwh,
            battery_mode,
            battery_soc: state.battery_soc,
        }
    }
}

impl fmt::Display for KpiSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Now ---")?;
        writeln!(
            f,
            "PV:          {} ({} today)",
            format_kw(self.pv_kw),
            format_kwh(self.pv_energy_kwh)
        )?;
        writeln!(f, "Heat pump:   {}", format_kw(self.heat_pump_kw))?;
        writeln!(
            f,
            "Grid:        {} {:?} ({})",
            format_kw(self.grid_kw),
            self.grid_direction,
            format_kwh(self.grid_energy_kwh)
        )?;
        writeln!(
            f,
            "EV:          {} {:?} ({})",
            format_kw(self.ev_kw),
            self.ev_mode,
            format_kwh(self.ev_energy_kwh)
        )?;
        write!(
            f,
            "Battery:     {:?} at {:.1}%",
            self.battery_mode, self.battery_soc
        )
    }
}

/// Aggregate indicators over a series of samples.
///
/// Computed post-hoc from the samples so the report always agrees with the
/// data it summarizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiReport {
    /// Number of samples summarized.
    pub samples: usize,
    /// Peak grid import (kW, positive).
    pub peak_import_kw: f64,
    /// Peak grid export (kW, positive magnitude).
    pub peak_export_kw: f64,
    /// Peak PV generation (kW).
    pub peak_pv_kw: f64,
    /// Battery energy throughput (kWh, sum of |power| * dt between samples).
    pub battery_throughput_kwh: f64,
}

impl KpiReport {
    /// Computes the report from samples ordered oldest to newest.
    ///
    /// Throughput integrates each sample's battery power over the gap to its
    /// predecessor, so the first sample contributes nothing.
    pub fn from_series<'a>(series: impl IntoIterator<Item = &'a SimulationState>) -> Self {
        let mut report = Self::default();
        let mut prev_time: Option<i64> = None;

        for s in series {
            report.samples += 1;
            report.peak_import_kw = report.peak_import_kw.max(s.grid);
            report.peak_export_kw = report.peak_export_kw.max(-s.grid);
            report.peak_pv_kw = report.peak_pv_kw.max(s.pv);
            if let Some(prev) = prev_time {
                report.battery_throughput_kwh += s.battery_power.abs() * step_hours(s.time, Some(prev));
            }
            prev_time = Some(s.time);
        }

        report
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Samples:               {}", self.samples)?;
        writeln!(f, "Peak import:           {:.2} kW", self.peak_import_kw)?;
        writeln!(f, "Peak export:           {:.2} kW", self.peak_export_kw)?;
        writeln!(f, "Peak PV:               {:.2} kW", self.peak_pv_kw)?;
        write!(
            f,
            "Battery throughput:    {:.2} kWh",
            self.battery_throughput_kwh
        )
    }
}
