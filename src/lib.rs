//! Household energy-flow simulator: PV, battery, grid, heat pump and a
//! bidirectional EV, stepped on a simulated clock.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod devices;
/// Live-feed payload decoding and feed mode selection.
pub mod feed;
pub mod io;
/// Generator, series buffer, flow attribution, self-tests and session driver.
pub mod sim;
pub mod telemetry;
