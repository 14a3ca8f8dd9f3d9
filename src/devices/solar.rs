use crate::devices::types::{Source, StepContext, uniform};
use rand::Rng;

/// A rooftop PV array driven by the sun factor of the current step.
///
/// Output follows a super-linear response to sun elevation,
/// `sun_factor^exponent * kw_peak`, scaled by uniform multiplicative noise
/// that stands in for passing clouds.
///
/// # Examples
///
/// ```
/// use home_energy_sim::devices::{SolarPv, Source, StepContext};
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let pv = SolarPv::default();
/// let mut rng = StdRng::seed_from_u64(42);
///
/// // Midnight: no generation
/// let night = StepContext::at_hour(0, 0.0);
/// assert_eq!(pv.power_kw(&night, &mut rng), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct SolarPv {
    /// Peak power output in kilowatts.
    pub kw_peak: f64,

    /// Exponent applied to the sun factor.
    pub exponent: f64,

    /// Lower bound of the multiplicative noise factor.
    pub noise_min: f64,

    /// Upper bound of the multiplicative noise factor.
    pub noise_max: f64,
}

impl Default for SolarPv {
    fn default() -> Self {
        Self {
            kw_peak: 6.0,
            exponent: 1.4,
            noise_min: 0.85,
            noise_max: 1.15,
        }
    }
}

impl Source for SolarPv {
    /// Generation in kW (always >= 0). The noise draw happens at night too.
    fn power_kw<R: Rng + ?Sized>(&self, context: &StepContext, rng: &mut R) -> f64 {
        let noise = uniform(rng, self.noise_min, self.noise_max);
        context.sun_factor.powf(self.exponent) * self.kw_peak * noise
    }

    fn device_type(&self) -> &'static str {
        "SolarPV"
    }
}
