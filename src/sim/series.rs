//! Bounded, time-ordered history of samples.

use std::collections::VecDeque;

use rand::Rng;

use super::clock::SIM_STEP_MS;
use super::generator::Generator;
use super::types::SimulationState;

/// Maximum number of samples kept (6 hours at one-minute resolution).
pub const SERIES_CAPACITY: usize = 360;

/// Length of the synthesized history at startup, in milliseconds.
pub const SEED_HISTORY_MS: i64 = 60 * SIM_STEP_MS;

/// FIFO ring of samples ordered by ascending time.
///
/// Appending beyond capacity evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    samples: VecDeque<SimulationState>,
    capacity: usize,
}

impl Default for SeriesBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesBuffer {
    /// Creates an empty buffer with the standard capacity of 360 samples.
    pub fn new() -> Self {
        Self::with_capacity(SERIES_CAPACITY)
    }

    /// Creates an empty buffer holding at most `capacity` samples (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Synthesizes one hour of history ending at `now_ms`.
    ///
    /// An unrecorded bootstrap sample one step before the window starts the
    /// chain; the window itself is sampled every minute from `now_ms - 60 min`
    /// through `now_ms` inclusive.
    pub fn seeded<R: Rng + ?Sized>(generator: &Generator, now_ms: i64, rng: &mut R) -> Self {
        let start = now_ms - SEED_HISTORY_MS;
        let mut buffer = Self::new();
        let mut prev = generator.step(start - SIM_STEP_MS, None, rng);
        let mut t = start;
        while t <= now_ms {
            let next = generator.step(t, Some(&prev), rng);
            buffer.append(next);
            prev = next;
            t += SIM_STEP_MS;
        }
        buffer
    }

    /// Appends a sample, returning the evicted oldest sample when full.
    ///
    /// Callers append in ascending time order.
    pub fn append(&mut self, state: SimulationState) -> Option<SimulationState> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(state);
        evicted
    }

    /// Newest sample, if any.
    pub fn latest(&self) -> Option<&SimulationState> {
        self.samples.back()
    }

    /// Oldest retained sample, if any.
    pub fn oldest(&self) -> Option<&SimulationState> {
        self.samples.front()
    }

    /// Copy of the samples, oldest to newest.
    pub fn snapshot(&self) -> Vec<SimulationState> {
        self.samples.iter().copied().collect()
    }

    /// Samples with `from_ms <= time <= to_ms`, oldest to newest.
    pub fn range(&self, from_ms: i64, to_ms: i64) -> Vec<SimulationState> {
        self.samples
            .iter()
            .filter(|s| s.time >= from_ms && s.time <= to_ms)
            .copied()
            .collect()
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &SimulationState> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    const START_MS: i64 = 1_717_200_000_000;

    fn run_into(buffer: &mut SeriesBuffer, steps: usize) -> Vec<SimulationState> {
        let g = Generator::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut prev: Option<SimulationState> = None;
        let mut all = Vec::with_capacity(steps);
        for i in 0..steps {
            let s = g.step(START_MS + i as i64 * SIM_STEP_MS, prev.as_ref(), &mut rng);
            buffer.append(s);
            all.push(s);
            prev = Some(s);
        }
        all
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut buffer = SeriesBuffer::new();
        let all = run_into(&mut buffer, 400);
        assert_eq!(buffer.len(), 360);
        // 400 - 360 = 40 evicted, so the 41st sample is the oldest retained
        assert_eq!(buffer.oldest().map(|s| s.time), Some(all[40].time));
        assert_eq!(buffer.latest().map(|s| s.time), Some(all[399].time));
    }

    #[test]
    fn append_reports_eviction() {
        let mut buffer = SeriesBuffer::with_capacity(2);
        let all = run_into(&mut SeriesBuffer::new(), 3);
        assert_eq!(buffer.append(all[0]), None);
        assert_eq!(buffer.append(all[1]), None);
        assert_eq!(buffer.append(all[2]), Some(all[0]));
    }

    #[test]
    fn snapshot_is_ascending() {
        let mut buffer = SeriesBuffer::new();
        run_into(&mut buffer, 50);
        let snap = buffer.snapshot();
        assert_eq!(snap.len(), 50);
        assert!(snap.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn seeded_history_covers_last_hour() {
        let g = Generator::default();
        let mut rng = StdRng::seed_from_u64(6);
        let now = START_MS + 12 * 3_600_000;
        let buffer = SeriesBuffer::seeded(&g, now, &mut rng);
        assert_eq!(buffer.len(), 61);
        assert_eq!(buffer.oldest().map(|s| s.time), Some(now - SEED_HISTORY_MS));
        assert_eq!(buffer.latest().map(|s| s.time), Some(now));
        assert!(buffer.iter().all(SimulationState::soc_in_range));
    }

    #[test]
    fn range_is_inclusive() {
        let mut buffer = SeriesBuffer::new();
        let all = run_into(&mut buffer, 10);
        let r = buffer.range(all[2].time, all[4].time);
        assert_eq!(r.len(), 3);
        assert!(buffer.range(all[4].time, all[2].time).is_empty());
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut buffer = SeriesBuffer::with_capacity(0);
        let all = run_into(&mut SeriesBuffer::new(), 2);
        buffer.append(all[0]);
        buffer.append(all[1]);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest(), Some(&all[1]));
    }
}
