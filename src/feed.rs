use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::clock::SIM_STEP_MS;
use crate::sim::integrator::{SOC_MAX, SOC_MIN, step_hours};
use crate::sim::power_balance::load_total_kw;
use crate::sim::types::SimulationState;

/// Where the session's samples come from. Exactly one mode is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum FeedMode {
    /// Samples are produced by the generator on every tick.
    #[default]
    Simulated,
    /// Samples arrive from an external producer at `endpoint`.
    Live { endpoint: String },
}

impl FeedMode {
    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated)
    }
}

/// Reasons a live payload is discarded.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("field `{0}` is not a finite number")]
    NonFinite(&'static str),
    #[error("field `{field}` = {value} is outside 5..100%")]
    SocOutOfRange { field: &'static str, value: f64 },
    #[error("time {time} is not after the previous sample at {previous}")]
    OutOfOrder { time: i64, previous: i64 },
}

/// Wire shape of a live message. Unknown keys (including `loadTotal`) are
/// ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LivePayload {
    time: Option<i64>,
    pv: f64,
    load_base: f64,
    heat_pump: f64,
    ev_power: f64,
    ev_soc: f64,
    battery_soc: f64,
    battery_power: f64,
    grid: f64,
    pv_energy: Option<f64>,
    grid_import_energy: Option<f64>,
    grid_export_energy: Option<f64>,
    ev_charge_energy: Option<f64>,
    ev_discharge_energy: Option<f64>,
}

impl LivePayload {
    fn required_fields(&self) -> [(&'static str, f64); 8] {
        [
            ("pv", self.pv),
            ("loadBase", self.load_base),
            ("heatPump", self.heat_pump),
            ("evPower", self.ev_power),
            ("evSoc", self.ev_soc),
            ("batterySoc", self.battery_soc),
            ("batteryPower", self.battery_power),
            ("grid", self.grid),
        ]
    }

    fn counters(&self) -> [(&'static str, Option<f64>); 5] {
        [
            ("pvEnergy", self.pv_energy),
            ("gridImportEnergy", self.grid_import_energy),
            ("gridExportEnergy", self.grid_export_energy),
            ("evChargeEnergy", self.ev_charge_energy),
            ("evDischargeEnergy", self.ev_discharge_energy),
        ]
    }
}

/// Decodes one live message into a sample following `prev`.
///
/// A missing `time` defaults to one step after `prev`. `loadTotal` is always
/// recomputed from the components. Missing energy counters are integrated
/// forward from `prev` using the payload's powers; supplied counters never go
/// below `prev`, so counters stay monotone across live and simulated samples.
pub fn decode_payload(text: &str, prev: &SimulationState) -> Result<SimulationState, FeedError> {
    let payload: LivePayload = serde_json::from_str(text)?;

    for (name, value) in payload.required_fields() {
        if !value.is_finite() {
            return Err(FeedError::NonFinite(name));
        }
    }
    for (name, value) in payload.counters() {
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(FeedError::NonFinite(name));
        }
    }
    for (field, value) in [("evSoc", payload.ev_soc), ("batterySoc", payload.battery_soc)] {
        if !(SOC_MIN..=SOC_MAX).contains(&value) {
            return Err(FeedError::SocOutOfRange { field, value });
        }
    }

    let time = payload.time.unwrap_or(prev.time.saturating_add(SIM_STEP_MS));
    if time <= prev.time {
        return Err(FeedError::OutOfOrder {
            time,
            previous: prev.time,
        });
    }

    let integrated = prev.energy().advance(
        payload.pv,
        payload.grid,
        payload.ev_power,
        step_hours(time, Some(prev.time)),
    );
    let counter = |supplied: Option<f64>, previous: f64, fallback: f64| match supplied {
        Some(v) => v.max(previous),
        None => fallback,
    };

    Ok(SimulationState {
        time,
        pv: payload.pv,
        load_base: payload.load_base,
        heat_pump: payload.heat_pump,
        ev_power: payload.ev_power,
        ev_soc: payload.ev_soc,
        battery_soc: payload.battery_soc,
        battery_power: payload.battery_power,
        grid: payload.grid,
        pv_energy: counter(payload.pv_energy, prev.pv_energy, integrated.pv_kwh),
        grid_import_energy: counter(
            payload.grid_import_energy,
            prev.grid_import_energy,
            integrated.grid_import_kwh,
        ),
        grid_export_energy: counter(
            payload.grid_export_energy,
            prev.grid_export_energy,
            integrated.grid_export_kwh,
        ),
        ev_charge_energy: counter(
            payload.ev_charge_energy,
            prev.ev_charge_energy,
            integrated.ev_charge_kwh,
        ),
        ev_discharge_energy: counter(
            payload.ev_discharge_energy,
            prev.ev_discharge_energy,
            integrated.ev_discharge_kwh,
        ),
        load_total: load_total_kw(payload.load_base, payload.heat_pump, payload.ev_power),
    })
}
