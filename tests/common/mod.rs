//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use rand::SeedableRng;
use rand::rngs::StdRng;

use home_energy_sim::feed::FeedMode;
use home_energy_sim::sim::generator::Generator;
use home_energy_sim::sim::session::Session;
use home_energy_sim::sim::types::SimulationState;

/// 2024-06-01T00:00:00Z
pub const MIDNIGHT_MS: i64 = 1_717_200_000_000;

/// One simulated minute.
pub const STEP_MS: i64 = 60_000;

/// Default seed used across integration tests.
pub const SEED: u64 = 42;

/// Stopped simulated session seeded at `now_ms` with the default seed.
pub fn session_at(now_ms: i64) -> Session {
    Session::new(Generator::default(), SEED, now_ms, FeedMode::Simulated)
}

/// Live-mode feed pointing at a placeholder endpoint.
pub fn live_mode() -> FeedMode {
    FeedMode::Live {
        endpoint: "ws://127.0.0.1:9000/energy".into(),
    }
}

/// Runs the bare generator for `steps` one-minute steps starting at `start_ms`.
pub fn generate_run(start_ms: i64, steps: usize, seed: u64) -> Vec<SimulationState> {
    let generator = Generator::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out: Vec<SimulationState> = Vec::with_capacity(steps);
    for i in 0..steps {
        let t = start_ms + i as i64 * STEP_MS;
        let next = generator.step(t, out.last(), &mut rng);
        out.push(next);
    }
    out
}

/// A well-formed live payload with the eight required fields.
pub fn live_payload(pv: f64, grid: f64) -> String {
    format!(
        r#"{{"pv":{pv},"loadBase":0.6,"heatPump":1.0,"evPower":0.0,"evSoc":55.0,"batterySoc":62.0,"batteryPower":0.0,"grid":{grid}}}"#
    )
}
