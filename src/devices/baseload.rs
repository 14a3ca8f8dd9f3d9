use crate::devices::types::{Source, StepContext, cycle_angle, uniform};
use rand::Rng;

/// Household baseline consumption: a slow oscillation plus noise, floored.
///
/// `max(floor_kw, mean_kw + amp_kw * sin(2π t / period) + U(-noise_kw, noise_kw))`
///
/// Recomputed from the absolute timestamp each step, so two calls with the same
/// time and the same noise draw agree regardless of history.
#[derive(Debug, Clone)]
pub struct BaseLoad {
    /// Mean consumption in kilowatts.
    pub mean_kw: f64,

    /// Amplitude of the oscillation in kilowatts.
    pub amp_kw: f64,

    /// Oscillation period in milliseconds.
    pub period_ms: i64,

    /// Half-width of the additive uniform noise in kilowatts.
    pub noise_kw: f64,

    /// Minimum consumption in kilowatts.
    pub floor_kw: f64,
}

impl Default for BaseLoad {
    fn default() -> Self {
        Self {
            mean_kw: 0.6,
            amp_kw: 0.2,
            period_ms: 15 * 60_000,
            noise_kw: 0.05,
            floor_kw: 0.3,
        }
    }
}

impl Source for BaseLoad {
    fn power_kw<R: Rng + ?Sized>(&self, context: &StepContext, rng: &mut R) -> f64 {
        let sinus = cycle_angle(context.time_ms, self.period_ms).sin();
        let noise = uniform(rng, -self.noise_kw, self.noise_kw);
        (self.mean_kw + self.amp_kw * sinus + noise).max(self.floor_kw)
    }

    fn device_type(&self) -> &'static str {
        "BaseLoad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn stays_within_envelope() {
        let load = BaseLoad::default();
        let mut rng = StdRng::seed_from_u64(11);
        for minute in 0..240 {
            let ctx = StepContext::at_hour(minute * 60_000, 0.0);
            let kw = load.power_kw(&ctx, &mut rng);
            assert!(kw >= 0.3);
            assert!(kw <= 0.6 + 0.2 + 0.05);
        }
    }

    #[test]
    fn floor_is_enforced() {
        let load = BaseLoad {
            mean_kw: 0.0,
            ..BaseLoad::default()
        };
        let mut rng = StdRng::seed_from_u64(12);
        let ctx = StepContext::at_hour(0, 0.0);
        assert_eq!(load.power_kw(&ctx, &mut rng), 0.3);
    }

    #[test]
    fn follows_oscillation_without_noise() {
        let load = BaseLoad {
            noise_kw: 0.0,
            ..BaseLoad::default()
        };
        let mut rng = StdRng::seed_from_u64(13);
        // Quarter period: sin = 1
        let peak = load.power_kw(&StepContext::at_hour(225_000, 0.0), &mut rng);
        assert!((peak - 0.8).abs() < 1e-9);
        // Three quarters: sin = -1
        let trough = load.power_kw(&StepContext::at_hour(675_000, 0.0), &mut rng);
        assert!((trough - 0.4).abs() < 1e-9);
    }
}
