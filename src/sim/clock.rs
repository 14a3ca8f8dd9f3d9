/// Simulated time advanced per tick, in milliseconds (one minute).
pub const SIM_STEP_MS: i64 = 60_000;

/// A simulated clock that advances by a fixed step.
///
/// The clock is independent of wall-clock time: the driver decides how often
/// to tick, the clock decides how far simulated time moves per tick.
///
/// # Examples
///
/// ```
/// use home_energy_sim::sim::clock::SimClock;
///
/// let mut clock = SimClock::new(0);
/// assert_eq!(clock.tick(), 60_000);
/// assert_eq!(clock.tick(), 120_000);
/// assert_eq!(clock.now_ms(), 120_000);
/// ```
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Current simulated time
    now_ms: i64,
    /// Simulated milliseconds per tick
    step_ms: i64,
}

impl SimClock {
    /// Creates a clock at `start_ms` with the default one-minute step.
    pub fn new(start_ms: i64) -> Self {
        Self::with_step(start_ms, SIM_STEP_MS)
    }

    /// Creates a clock with a custom step (clamped to at least 1 ms).
    pub fn with_step(start_ms: i64, step_ms: i64) -> Self {
        Self {
            now_ms: start_ms,
            step_ms: step_ms.max(1),
        }
    }

    /// Advances by one step and returns the new time.
    pub fn tick(&mut self) -> i64 {
        self.now_ms = self.now_ms.saturating_add(self.step_ms);
        self.now_ms
    }

    /// Current simulated time.
    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    /// Step length in milliseconds.
    pub fn step_ms(&self) -> i64 {
        self.step_ms
    }

    /// Moves the clock to `time_ms` (used when an external sample is published).
    pub fn sync(&mut self, time_ms: i64) {
        self.now_ms = time_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock() {
        let clock = SimClock::new(5);
        assert_eq!(clock.now_ms, 5);
        assert_eq!(clock.step_ms, SIM_STEP_MS);
    }

    #[test]
    fn test_tick() {
        let mut clock = SimClock::with_step(0, 10);
        assert_eq!(clock.tick(), 10);
        assert_eq!(clock.tick(), 20);
    }

    #[test]
    fn test_zero_step_is_clamped() {
        let mut clock = SimClock::with_step(0, 0);
        assert_eq!(clock.tick(), 1);
    }

    #[test]
    fn test_sync() {
        let mut clock = SimClock::new(0);
        clock.sync(1_000_000);
        assert_eq!(clock.tick(), 1_060_000);
    }
}
