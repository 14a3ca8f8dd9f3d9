//! A simulation session: the generator, its RNG, the series buffer and the
//! published current sample, plus the feed mode toggle.

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::feed::{FeedMode, decode_payload};

use super::clock::SimClock;
use super::flow::{FlowEdge, attribute};
use super::generator::Generator;
use super::kpi::{KpiReport, KpiSummary};
use super::selftest::{CheckResult, run_self_tests};
use super::series::SeriesBuffer;
use super::types::SimulationState;

/// Owns everything one simulation instance mutates.
///
/// The series and current sample only change inside [`Session::tick`] and
/// [`Session::ingest_live`], and always in the same order: the sample is
/// appended to the series first, then published as current.
#[derive(Debug, Clone)]
pub struct Session {
    generator: Generator,
    rng: StdRng,
    clock: SimClock,
    series: SeriesBuffer,
    current: SimulationState,
    mode: FeedMode,
    connected: bool,
    running: bool,
}

impl Session {
    /// Creates a stopped session whose series holds one hour of synthesized
    /// history ending at `now_ms`.
    ///
    /// # Arguments
    ///
    /// * `generator` - Step function for simulated samples
    /// * `seed` - Seed of the session's random source
    /// * `now_ms` - Simulated time of the newest seeded sample
    /// * `mode` - Initial feed mode
    pub fn new(generator: Generator, seed: u64, now_ms: i64, mode: FeedMode) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let series = SeriesBuffer::seeded(&generator, now_ms, &mut rng);
        let current = match series.latest() {
            Some(s) => *s,
            None => generator.step(now_ms, None, &mut rng),
        };
        info!(seed, now_ms, samples = series.len(), ?mode, "session seeded");

        Self {
            generator,
            rng,
            clock: SimClock::new(current.time),
            series,
            current,
            mode,
            connected: false,
            running: false,
        }
    }

    /// Creates a session from the `[session]` config section.
    pub fn from_config(config: &SessionConfig, now_ms: i64) -> Self {
        Self::new(
            Generator::new(config.utc_offset()),
            config.seed,
            now_ms,
            config.feed_mode(),
        )
    }

    pub fn start(&mut self) {
        if !self.running {
            info!("session started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!(time = self.current.time, "session stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances the simulated clock by one step and publishes the generated
    /// sample.
    ///
    /// Returns `None` without touching state when the session is stopped or
    /// fed from a live source.
    pub fn tick(&mut self) -> Option<SimulationState> {
        if !self.running || !self.mode.is_simulated() {
            return None;
        }
        let time = self.clock.tick();
        let next = self.generator.step(time, Some(&self.current), &mut self.rng);
        self.series.append(next);
        self.current = next;
        debug!(time, grid = next.grid, battery_soc = next.battery_soc, "tick");
        Some(next)
    }

    /// The published current sample, unrounded.
    pub fn latest(&self) -> &SimulationState {
        &self.current
    }

    pub fn series(&self) -> &SeriesBuffer {
        &self.series
    }

    /// Current simulated time.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Flow edges of the rounded current sample.
    pub fn flows(&self) -> Vec<FlowEdge> {
        attribute(&self.current.rounded())
    }

    /// Self-test results for the series and the rounded current sample.
    pub fn self_test(&self) -> Vec<CheckResult> {
        run_self_tests(&self.series, Some(&self.current.rounded()))
    }

    /// Tile values of the rounded current sample.
    pub fn kpis(&self) -> KpiSummary {
        KpiSummary::from_state(&self.current.rounded())
    }

    /// Aggregate indicators over the retained series.
    pub fn report(&self) -> KpiReport {
        KpiReport::from_series(self.series.iter())
    }

    /// Switches the feed mode. Switching to simulated clears connectivity.
    pub fn set_mode(&mut self, mode: FeedMode) {
        if mode == self.mode {
            return;
        }
        if mode.is_simulated() {
            self.connected = false;
        }
        info!(?mode, "feed mode changed");
        self.mode = mode;
    }

    pub fn mode(&self) -> &FeedMode {
        &self.mode
    }

    /// Publishes a live payload.
    ///
    /// Only accepted in live mode. Payloads that fail to decode are dropped
    /// and leave the session unchanged. Returns whether the payload was
    /// published.
    pub fn ingest_live(&mut self, text: &str) -> bool {
        if self.mode.is_simulated() {
            debug!("live payload ignored in simulated mode");
            return false;
        }
        match decode_payload(text, &self.current) {
            Ok(next) => {
                self.series.append(next);
                self.current = next;
                self.clock.sync(next.time);
                debug!(time = next.time, "live sample published");
                true
            }
            Err(err) => {
                debug!(%err, "live payload discarded");
                false
            }
        }
    }

    /// Marks the live transport as connected. Ignored in simulated mode.
    pub fn on_transport_open(&mut self) {
        if let FeedMode::Live { endpoint } = &self.mode {
            info!(%endpoint, "live feed connected");
            self.connected = true;
        }
    }

    /// Records a transport failure and falls back to simulated data.
    pub fn on_transport_error(&mut self, reason: &str) {
        warn!(reason, "live feed transport error, falling back to simulated data");
        self.connected = false;
        self.mode = FeedMode::Simulated;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}
