//! Advisory invariant checks over the latest sample and the series.
//!
//! Failures are reported, never raised, and nothing here mutates state.

use serde::Serialize;

use super::flow::primary_pv_flows;
use super::integrator::{SOC_MAX, SOC_MIN};
use super::series::SeriesBuffer;
use super::types::SimulationState;

/// Minimum series length (exclusive) for the history check to pass.
pub const MIN_SERIES_LEN: usize = 10;

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub pass: bool,
    pub message: String,
}

impl CheckResult {
    fn new(name: &'static str, pass: bool, message: impl Into<String>) -> Self {
        Self {
            name,
            pass,
            message: message.into(),
        }
    }
}

/// Runs the self-tests in a fixed order.
///
/// `latest` defaults to the newest sample of `series`. Without any sample the
/// per-sample checks fail with a "no data" message.
pub fn run_self_tests(series: &SeriesBuffer, latest: Option<&SimulationState>) -> Vec<CheckResult> {
    let latest = latest.or_else(|| series.latest());

    vec![
        soc_check("battery SOC within 5..100%", latest.map(|s| s.battery_soc)),
        soc_check("EV SOC within 5..100%", latest.map(|s| s.ev_soc)),
        finite_check(latest),
        CheckResult::new(
            "series length > 10",
            series.len() > MIN_SERIES_LEN,
            format!("len={}", series.len()),
        ),
        flows_check(latest),
    ]
}

/// True when every check passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.pass)
}

fn soc_check(name: &'static str, soc: Option<f64>) -> CheckResult {
    match soc {
        Some(soc) => CheckResult::new(
            name,
            (SOC_MIN..=SOC_MAX).contains(&soc),
            format!("SOC={soc}"),
        ),
        None => CheckResult::new(name, false, "no data"),
    }
}

fn finite_check(latest: Option<&SimulationState>) -> CheckResult {
    const NAME: &str = "no NaN values";
    const KEYS: [&str; 7] = [
        "pv",
        "loadBase",
        "heatPump",
        "evPower",
        "batteryPower",
        "grid",
        "loadTotal",
    ];

    let Some(s) = latest else {
        return CheckResult::new(NAME, false, "no data");
    };
    let bad: Vec<&str> = s
        .numeric_fields()
        .into_iter()
        .filter(|(key, v)| KEYS.contains(key) && !v.is_finite())
        .map(|(key, _)| key)
        .collect();

    if bad.is_empty() {
        CheckResult::new(NAME, true, "ok")
    } else {
        CheckResult::new(NAME, false, format!("non-finite in {}", bad.join(", ")))
    }
}

fn flows_check(latest: Option<&SimulationState>) -> CheckResult {
    const NAME: &str = "flows >= 0";

    let Some(s) = latest else {
        return CheckResult::new(NAME, false, "no data");
    };
    let flows = primary_pv_flows(s);
    if flows.iter().all(|f| *f >= 0.0) {
        CheckResult::new(NAME, true, "ok")
    } else {
        let listed: Vec<String> = flows.iter().map(f64::to_string).collect();
        CheckResult::new(NAME, false, format!("flows={}", listed.join(",")))
    }
}
