use crate::devices::types::{Source, StepContext, cycle_angle, uniform};
use rand::Rng;

/// Heat-pump draw with a duty-cycle-like oscillation, clamped to device limits.
///
/// `clamp(offset_kw + (1 + depth * sin(2π t / period)) * gain_kw + U(-noise_kw, noise_kw), min_kw, max_kw)`
#[derive(Debug, Clone)]
pub struct HeatPump {
    /// Constant standby draw in kilowatts.
    pub offset_kw: f64,

    /// Gain applied to the cycle term in kilowatts.
    pub gain_kw: f64,

    /// Relative depth of the cycle (0..1).
    pub depth: f64,

    /// Cycle period in milliseconds.
    pub period_ms: i64,

    /// Half-width of the additive uniform noise in kilowatts.
    pub noise_kw: f64,

    /// Minimum draw in kilowatts.
    pub min_kw: f64,

    /// Maximum draw in kilowatts.
    pub max_kw: f64,
}

impl Default for HeatPump {
    fn default() -> Self {
        Self {
            offset_kw: 0.5,
            gain_kw: 1.2,
            depth: 0.6,
            period_ms: 8 * 60_000,
            noise_kw: 0.1,
            min_kw: 0.3,
            max_kw: 2.4,
        }
    }
}

impl Source for HeatPump {
    fn power_kw<R: Rng + ?Sized>(&self, context: &StepContext, rng: &mut R) -> f64 {
        let cycle = 1.0 + self.depth * cycle_angle(context.time_ms, self.period_ms).sin();
        let noise = uniform(rng, -self.noise_kw, self.noise_kw);
        (self.offset_kw + cycle * self.gain_kw + noise).clamp(self.min_kw, self.max_kw)
    }

    fn device_type(&self) -> &'static str {
        "HeatPump"
    }
}
