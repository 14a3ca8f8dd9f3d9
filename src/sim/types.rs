//! The per-sample state record produced by the generator.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::format::{round1, round2};
use super::integrator::{EnergyTotals, SOC_MAX, SOC_MIN};

/// One immutable sample of the household energy system.
///
/// Produced by [`super::generator::Generator::step`] (or decoded from a live
/// feed) and never modified afterwards; each step yields a new record.
///
/// Sign conventions:
/// - `ev_power`: positive = charging (load), negative = V2H discharge
/// - `battery_power`: positive = charging, negative = discharging
/// - `grid`: positive = import, negative = export
///
/// Serialized field names follow the camelCase record schema consumed by the
/// rendering layer (`loadBase`, `heatPump`, `gridImportEnergy`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationState {
    /// Simulated time in milliseconds since the Unix epoch.
    pub time: i64,
    /// PV generation (kW, >= 0).
    pub pv: f64,
    /// Household baseline consumption (kW, >= 0.3).
    pub load_base: f64,
    /// Heat-pump consumption (kW, within [0.3, 2.4]).
    pub heat_pump: f64,
    /// EV power (kW).
    pub ev_power: f64,
    /// EV state of charge (%, within [5, 100]).
    pub ev_soc: f64,
    /// Battery state of charge (%, within [5, 100]).
    pub battery_soc: f64,
    /// Battery power (kW).
    pub battery_power: f64,
    /// Grid power (kW).
    pub grid: f64,
    /// Cumulative PV energy (kWh).
    pub pv_energy: f64,
    /// Cumulative grid import (kWh).
    pub grid_import_energy: f64,
    /// Cumulative grid export (kWh).
    pub grid_export_energy: f64,
    /// Cumulative EV charge energy (kWh).
    pub ev_charge_energy: f64,
    /// Cumulative EV discharge energy (kWh).
    pub ev_discharge_energy: f64,
    /// `load_base + heat_pump + max(0, ev_power)` (kW).
    pub load_total: f64,
}

impl SimulationState {
    /// Field names in record order, matching the serialized keys.
    pub const FIELD_NAMES: [&'static str; 15] = [
        "time",
        "pv",
        "loadBase",
        "heatPump",
        "evPower",
        "evSoc",
        "batterySoc",
        "batteryPower",
        "grid",
        "pvEnergy",
        "gridImportEnergy",
        "gridExportEnergy",
        "evChargeEnergy",
        "evDischargeEnergy",
        "loadTotal",
    ];

    /// Returns the presentation copy of this record: power and SOC fields
    /// rounded to two decimals, energy counters to one.
    pub fn rounded(&self) -> Self {
        Self {
            time: self.time,
            pv: round2(self.pv),
            load_base: round2(self.load_base),
            heat_pump: round2(self.heat_pump),
            ev_power: round2(self.ev_power),
            ev_soc: round2(self.ev_soc),
            battery_soc: round2(self.battery_soc),
            battery_power: round2(self.battery_power),
            grid: round2(self.grid),
            pv_energy: round1(self.pv_energy),
            grid_import_energy: round1(self.grid_import_energy),
            grid_export_energy: round1(self.grid_export_energy),
            ev_charge_energy: round1(self.ev_charge_energy),
            ev_discharge_energy: round1(self.ev_discharge_energy),
            load_total: round2(self.load_total),
        }
    }

    /// The five cumulative counters of this sample.
    pub fn energy(&self) -> EnergyTotals {
        EnergyTotals {
            pv_kwh: self.pv_energy,
            grid_import_kwh: self.grid_import_energy,
            grid_export_kwh: self.grid_export_energy,
            ev_charge_kwh: self.ev_charge_energy,
            ev_discharge_kwh: self.ev_discharge_energy,
        }
    }

    /// Household consumption excluding the EV: `load_base + heat_pump`.
    pub fn household_kw(&self) -> f64 {
        self.load_base + self.heat_pump
    }

    /// The numeric fields paired with their record names (excluding `time`).
    pub fn numeric_fields(&self) -> [(&'static str, f64); 14] {
        [
            ("pv", self.pv),
            ("loadBase", self.load_base),
            ("heatPump", self.heat_pump),
            ("evPower", self.ev_power),
            ("evSoc", self.ev_soc),
            ("batterySoc", self.battery_soc),
            ("batteryPower", self.battery_power),
            ("grid", self.grid),
            ("pvEnergy", self.pv_energy),
            ("gridImportEnergy", self.grid_import_energy),
            ("gridExportEnergy", self.grid_export_energy),
            ("evChargeEnergy", self.ev_charge_energy),
            ("evDischargeEnergy", self.ev_discharge_energy),
            ("loadTotal", self.load_total),
        ]
    }

    /// True when every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        self.numeric_fields().iter().all(|(_, v)| v.is_finite())
    }

    /// True when both SOC values lie within the protective range.
    pub fn soc_in_range(&self) -> bool {
        let range = SOC_MIN..=SOC_MAX;
        range.contains(&self.battery_soc) && range.contains(&self.ev_soc)
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={} | pv={:>5.2}  load={:>5.2} (base={:.2} hp={:.2})  ev={:>6.2} \
             (SoC={:.1}%) | bat={:>6.2} (SoC={:.1}%)  grid={:>6.2} kW | \
             E pv={:.1} imp={:.1} exp={:.1} kWh",
            self.time,
            self.pv,
            self.load_total,
            self.load_base,
            self.heat_pump,
            self.ev_power,
            self.ev_soc,
            self.battery_power,
            self.battery_soc,
            self.grid,
            self.pv_energy,
            self.grid_import_energy,
            self.grid_export_energy,
        )
    }
}
