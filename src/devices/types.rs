//! Common types and traits for the source and load models.

use std::f64::consts::PI;

use chrono::{DateTime, FixedOffset, Timelike};
use rand::Rng;

/// Time-derived inputs shared by every model within one step.
///
/// # Fields
/// * `time_ms` - Absolute simulated time (milliseconds since the Unix epoch)
/// * `hour_of_day` - Fractional local hour, minute resolution
/// * `sun_factor` - Sun elevation proxy in `[0, 1]`, peaking at 12:00
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    pub time_ms: i64,
    pub hour_of_day: f64,
    pub sun_factor: f64,
}

impl StepContext {
    /// Derives the context for `time_ms` as seen from the given UTC offset.
    pub fn new(time_ms: i64, offset: &FixedOffset) -> Self {
        Self::at_hour(time_ms, hour_of_day(time_ms, offset))
    }

    /// Builds a context with an explicit local hour, ignoring the clock.
    pub fn at_hour(time_ms: i64, hour_of_day: f64) -> Self {
        Self {
            time_ms,
            hour_of_day,
            sun_factor: sun_factor(hour_of_day),
        }
    }
}

/// Trait for a model that produces or consumes power as a pure function of time.
///
/// Implementations must draw from `rng` exactly once per call so that a
/// seeded generator replays a run step for step.
pub trait Source {
    /// Returns the power in kilowatts at the given context.
    ///
    /// # Arguments
    ///
    /// * `context` - Time-derived inputs for the current step
    /// * `rng` - Injected randomness for the model's noise term
    fn power_kw<R: Rng + ?Sized>(&self, context: &StepContext, rng: &mut R) -> f64;

    /// Returns a human-readable type name for the model.
    fn device_type(&self) -> &'static str;
}

/// Fractional local hour of day (`hour + minute / 60`) for a millisecond timestamp.
///
/// Timestamps outside chrono's representable range map to midnight.
pub fn hour_of_day(time_ms: i64, offset: &FixedOffset) -> f64 {
    DateTime::from_timestamp_millis(time_ms).map_or(0.0, |utc| {
        let local = utc.with_timezone(offset);
        f64::from(local.hour()) + f64::from(local.minute()) / 60.0
    })
}

/// Sun elevation proxy: `max(0, sin(((hour - 6) / 12) * PI))`.
///
/// Zero before 06:00 and after 18:00, one at noon.
pub fn sun_factor(hour_of_day: f64) -> f64 {
    (((hour_of_day - 6.0) / 12.0) * PI).sin().max(0.0)
}

/// Draws a uniform sample from `[low, high)`.
///
/// Degenerate ranges (`low == high`) return `low` while still consuming a draw.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + rng.random::<f64>() * (high - low)
}

/// Phase of `time_ms` within a repeating period, as an angle in radians.
pub fn cycle_angle(time_ms: i64, period_ms: i64) -> f64 {
    let period_ms = period_ms.max(1);
    let pos = time_ms.rem_euclid(period_ms) as f64 / period_ms as f64;
    2.0 * PI * pos
}
