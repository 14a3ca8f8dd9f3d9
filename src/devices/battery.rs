use crate::sim::integrator::integrate_soc;

/// A stationary home battery with a SOC-proportional rate model.
///
/// The instantaneous charge rate shrinks linearly with remaining headroom and
/// the discharge rate shrinks linearly with remaining charge, so the battery
/// never swings across its full range near the SOC extremes.
///
/// # Power Flow Convention
/// - Positive power: Charging
/// - Negative power: Discharging
///
/// # Examples
///
/// ```
/// use home_energy_sim::devices::Battery;
///
/// let battery = Battery::default();
/// assert!((battery.can_charge_kw(60.0) - 1.6).abs() < 1e-9);
/// assert!((battery.can_discharge_kw(60.0) - 2.4).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct Battery {
    /// Usable capacity in kilowatt-hours.
    pub capacity_kwh: f64,

    /// Rate at full headroom (charging) or full charge (discharging), in kW.
    pub rate_scale_kw: f64,

    /// SOC assumed when no previous sample exists, in percent.
    pub bootstrap_soc: f64,
}

impl Default for Battery {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            rate_scale_kw: 4.0,
            bootstrap_soc: 60.0,
        }
    }
}

impl Battery {
    /// Charge headroom in kW: `rate_scale_kw * (1 - soc / 100)`, never negative.
    pub fn can_charge_kw(&self, soc: f64) -> f64 {
        (self.rate_scale_kw * (1.0 - soc / 100.0)).max(0.0)
    }

    /// Discharge capacity in kW: `rate_scale_kw * soc / 100`, never negative.
    pub fn can_discharge_kw(&self, soc: f64) -> f64 {
        (self.rate_scale_kw * (soc / 100.0)).max(0.0)
    }

    /// SOC after holding `power_kw` for `dt_hours`, clamped to the protective range.
    pub fn next_soc(&self, soc: f64, power_kw: f64, dt_hours: f64) -> f64 {
        integrate_soc(soc, power_kw, dt_hours, self.capacity_kwh)
    }
}
