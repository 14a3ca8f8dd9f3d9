use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::devices::types::{StepContext, uniform};
use crate::sim::integrator::integrate_soc;

/// Which EV rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvRule {
    /// PV-synchronous charging during daylight.
    DayCharge,
    /// Evening vehicle-to-home discharge.
    EveningV2h,
    /// Neither rule applies.
    Idle,
}

impl fmt::Display for EvRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DayCharge => "day-charge",
            Self::EveningV2h => "evening-v2h",
            Self::Idle => "idle",
        };
        f.write_str(label)
    }
}

/// Controller output for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvDecision {
    /// Rule that set the power.
    pub rule: EvRule,
    /// EV power in kW; positive = charging, negative = V2H discharge.
    pub power_kw: f64,
}

/// Rule-based charge / V2H controller for a bidirectional EV.
///
/// Rules are evaluated in a fixed order and a later rule overrides an earlier
/// one when both match:
/// 1. Day charge: `sun_factor > sun_threshold` and `soc < day_charge_target_soc`
/// 2. Evening V2H: hour in `[evening_start_hour, evening_end_hour]` and `soc > v2h_floor_soc`
/// 3. Otherwise idle
#[derive(Debug, Clone)]
pub struct EvController {
    /// Usable EV battery capacity in kilowatt-hours.
    pub capacity_kwh: f64,
    /// Day charging stops at or above this SOC (%).
    pub day_charge_target_soc: f64,
    /// Minimum sun factor for day charging.
    pub sun_threshold: f64,
    /// Charge power at zero sun (kW).
    pub charge_base_kw: f64,
    /// Additional charge power per unit sun factor (kW).
    pub charge_sun_gain_kw: f64,
    /// Charger limit (kW).
    pub fast_charge_kw: f64,
    /// V2H power before jitter (kW).
    pub v2h_base_kw: f64,
    /// V2H inverter limit (kW).
    pub v2h_max_kw: f64,
    /// V2H only runs above this SOC (%).
    pub v2h_floor_soc: f64,
    /// First hour of the evening window (inclusive).
    pub evening_start_hour: f64,
    /// Last hour of the evening window (inclusive).
    pub evening_end_hour: f64,
    /// Lower bound of the bootstrap SOC (%).
    pub bootstrap_soc_min: f64,
    /// Width of the uniform bootstrap SOC range (%).
    pub bootstrap_soc_span: f64,
}

impl Default for EvController {
    fn default() -> Self {
        Self {
            capacity_kwh: 60.0,
            day_charge_target_soc: 90.0,
            sun_threshold: 0.2,
            charge_base_kw: 1.0,
            charge_sun_gain_kw: 6.0,
            fast_charge_kw: 7.0,
            v2h_base_kw: 1.5,
            v2h_max_kw: 3.0,
            v2h_floor_soc: 40.0,
            evening_start_hour: 18.0,
            evening_end_hour: 22.0,
            bootstrap_soc_min: 50.0,
            bootstrap_soc_span: 20.0,
        }
    }
}

impl EvController {
    /// Decides the EV power for one step.
    ///
    /// Draws from `rng` only when the evening rule fires.
    ///
    /// # Arguments
    ///
    /// * `context` - Hour of day and sun factor for the step
    /// * `soc` - EV state of charge before the step (%)
    /// * `rng` - Source of the V2H jitter
    pub fn decide<R: Rng + ?Sized>(&self, context: &StepContext, soc: f64, rng: &mut R) -> EvDecision {
        let mut decision = EvDecision {
            rule: EvRule::Idle,
            power_kw: 0.0,
        };

        if context.sun_factor > self.sun_threshold && soc < self.day_charge_target_soc {
            decision = EvDecision {
                rule: EvRule::DayCharge,
                power_kw: self
                    .fast_charge_kw
                    .min(self.charge_base_kw + context.sun_factor * self.charge_sun_gain_kw),
            };
        }

        // Evaluated last: overrides day charging when both match.
        let evening = self.evening_start_hour..=self.evening_end_hour;
        if evening.contains(&context.hour_of_day) && soc > self.v2h_floor_soc {
            let jitter = rng.random::<f64>();
            decision = EvDecision {
                rule: EvRule::EveningV2h,
                power_kw: -self.v2h_max_kw.min(self.v2h_base_kw + jitter),
            };
        }

        decision
    }

    /// Draws the SOC used when a run starts without a previous sample.
    pub fn bootstrap_soc<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        uniform(
            rng,
            self.bootstrap_soc_min,
            self.bootstrap_soc_min + self.bootstrap_soc_span,
        )
    }

    /// SOC after holding `power_kw` for `dt_hours`, clamped to the protective range.
    pub fn next_soc(&self, soc: f64, power_kw: f64, dt_hours: f64) -> f64 {
        integrate_soc(soc, power_kw, dt_hours, self.capacity_kwh)
    }
}
