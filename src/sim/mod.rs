/// Simulated clock with a fixed step.
pub mod clock;
/// Periodic driver that advances a session.
pub mod driver;
pub mod flow;
/// Display rounding and unit formatting.
pub mod format;
pub mod generator;
/// State-of-charge and cumulative energy integration.
pub mod integrator;
pub mod kpi;
pub mod power_balance;
pub mod selftest;
pub mod series;
pub mod session;
pub mod types;
