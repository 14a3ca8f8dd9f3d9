//! API response and query types.
//!
//! Sample records keep their camelCase record keys; envelope fields are
//! snake_case.

use serde::{Deserialize, Serialize};

use crate::feed::FeedMode;
use crate::sim::kpi::KpiSummary;
use crate::sim::selftest::CheckResult;
use crate::sim::types::SimulationState;

/// Current sample with its derived views.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    /// Rounded current sample.
    pub latest: SimulationState,
    /// Tile values of `latest`.
    pub kpis: KpiSummary,
    /// Advisory self-test results.
    pub self_test: Vec<CheckResult>,
    pub mode: FeedMode,
    pub connected: bool,
    pub running: bool,
}

/// Query parameters for `GET /series`, in epoch milliseconds.
#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    /// Earliest sample time (inclusive).
    pub from: Option<i64>,
    /// Latest sample time (inclusive).
    pub to: Option<i64>,
}

/// Error body returned for invalid requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
