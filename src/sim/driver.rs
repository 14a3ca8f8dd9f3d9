use std::thread;
use std::time::Duration;

use tracing::info;

use super::session::Session;
use super::types::SimulationState;

/// Starts `session` and advances it by up to `ticks` steps.
///
/// Sleeps `interval` between consecutive ticks; a zero interval runs the
/// ticks back to back. `on_tick` sees every produced sample. Stops early if
/// the session stops producing samples (live mode). Returns the number of
/// ticks performed.
pub fn run_ticks(
    session: &mut Session,
    ticks: usize,
    interval: Duration,
    mut on_tick: impl FnMut(&SimulationState),
) -> usize {
    session.start();
    let mut done = 0;
    while done < ticks {
        if done > 0 && !interval.is_zero() {
            thread::sleep(interval);
        }
        let Some(state) = session.tick() else {
            break;
        };
        on_tick(&state);
        done += 1;
    }
    info!(ticks = done, "driver finished");
    done
}

/// Drives a shared session from a tokio interval until the task is aborted.
///
/// Missed ticks are skipped rather than replayed, and the write lock is held
/// for a whole step, so steps never overlap and readers never observe a
/// half-updated session.
#[cfg(feature = "api")]
pub fn spawn_driver(
    session: std::sync::Arc<tokio::sync::RwLock<Session>>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    use tokio::time::MissedTickBehavior;

    tokio::spawn(async move {
        session.write().await.start();
        let mut timer = tokio::time::interval(interval.max(Duration::from_millis(1)));
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // the first tick completes immediately
        timer.tick().await;
        loop {
            timer.tick().await;
            session.write().await.tick();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedMode;
    use crate::sim::generator::Generator;

    const NOON_MS: i64 = 1_717_243_200_000;

    fn make_session(mode: FeedMode) -> Session {
        Session::new(Generator::default(), 7, NOON_MS, mode)
    }

    #[test]
    fn batch_run_performs_all_ticks() {
        let mut session = make_session(FeedMode::Simulated);
        let mut seen = Vec::new();
        let n = run_ticks(&mut session, 25, Duration::ZERO, |s| seen.push(s.time));
        assert_eq!(n, 25);
        assert_eq!(seen.len(), 25);
        assert!(seen.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(session.series().len(), 61 + 25);
        assert!(session.is_running());
    }

    #[test]
    fn live_mode_produces_nothing() {
        let mut session = make_session(FeedMode::Live {
            endpoint: "ws://feed".into(),
        });
        let n = run_ticks(&mut session, 10, Duration::ZERO, |_| {});
        assert_eq!(n, 0);
    }

    #[test]
    fn short_interval_still_completes() {
        let mut session = make_session(FeedMode::Simulated);
        let n = run_ticks(&mut session, 3, Duration::from_millis(1), |_| {});
        assert_eq!(n, 3);
    }

    #[cfg(feature = "api")]
    #[tokio::test]
    async fn spawned_driver_advances_session() {
        use std::sync::Arc;
        use tokio::sync::RwLock;

        let shared = Arc::new(RwLock::new(make_session(FeedMode::Simulated)));
        let handle = spawn_driver(shared.clone(), Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();
        let session = shared.read().await;
        assert!(session.is_running());
        assert!(session.series().len() > 61);
    }
}
