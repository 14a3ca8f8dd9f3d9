//! State-of-charge and cumulative energy integration.

/// Lower SOC limit in percent (protective reserve).
pub const SOC_MIN: f64 = 5.0;

/// Upper SOC limit in percent.
pub const SOC_MAX: f64 = 100.0;

/// Step length assumed for the first sample of a run, in hours.
pub const BOOTSTRAP_DT_HOURS: f64 = 1.0 / 60.0;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Elapsed hours between the previous sample and `time_ms`.
///
/// Returns [`BOOTSTRAP_DT_HOURS`] when there is no previous sample. A
/// non-increasing timestamp yields zero so counters never run backwards.
pub fn step_hours(time_ms: i64, prev_time_ms: Option<i64>) -> f64 {
    match prev_time_ms {
        Some(prev) => (time_ms.saturating_sub(prev) as f64 / MS_PER_HOUR).max(0.0),
        None => BOOTSTRAP_DT_HOURS,
    }
}

/// Integrates `power_kw` over `dt_hours` into a SOC, clamped to `[SOC_MIN, SOC_MAX]`.
///
/// # Arguments
///
/// * `soc` - SOC before the step (%)
/// * `power_kw` - Power held during the step (positive = charging)
/// * `dt_hours` - Step length in hours
/// * `capacity_kwh` - Usable capacity of the pack
pub fn integrate_soc(soc: f64, power_kw: f64, dt_hours: f64, capacity_kwh: f64) -> f64 {
    (soc + power_kw * 100.0 * dt_hours / capacity_kwh).clamp(SOC_MIN, SOC_MAX)
}

/// Cumulative energy counters (kWh) carried from sample to sample.
///
/// Each counter only ever grows: every increment is `max(0, rate) * dt_hours`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyTotals {
    pub pv_kwh: f64,
    pub grid_import_kwh: f64,
    pub grid_export_kwh: f64,
    pub ev_charge_kwh: f64,
    pub ev_discharge_kwh: f64,
}

impl EnergyTotals {
    /// Returns the totals after one step.
    ///
    /// # Arguments
    ///
    /// * `pv_kw` - PV generation (>= 0)
    /// * `grid_kw` - Grid power (positive = import, negative = export)
    /// * `ev_kw` - EV power (positive = charging, negative = V2H)
    /// * `dt_hours` - Step length in hours (>= 0)
    pub fn advance(&self, pv_kw: f64, grid_kw: f64, ev_kw: f64, dt_hours: f64) -> Self {
        let dt = dt_hours.max(0.0);
        Self {
            pv_kwh: self.pv_kwh + pv_kw.max(0.0) * dt,
            grid_import_kwh: self.grid_import_kwh + grid_kw.max(0.0) * dt,
            grid_export_kwh: self.grid_export_kwh + (-grid_kw).max(0.0) * dt,
            ev_charge_kwh: self.ev_charge_kwh + ev_kw.max(0.0) * dt,
            ev_discharge_kwh: self.ev_discharge_kwh + (-ev_kw).max(0.0) * dt,
        }
    }

    /// True when no counter in `self` is below its value in `earlier`.
    pub fn dominates(&self, earlier: &Self) -> bool {
        self.pv_kwh >= earlier.pv_kwh
            && self.grid_import_kwh >= earlier.grid_import_kwh
            && self.grid_export_kwh >= earlier.grid_export_kwh
            && self.ev_charge_kwh >= earlier.ev_charge_kwh
            && self.ev_discharge_kwh >= earlier.ev_discharge_kwh
    }
}
