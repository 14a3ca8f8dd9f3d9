//! Rounding and unit formatting applied at the presentation boundary.
//!
//! The generator keeps full precision; only emitted records pass through here.

/// Rounds to two decimals (power and SOC fields).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Rounds to one decimal (energy fields).
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Formats a power value, e.g. `"1.25 kW"`.
pub fn format_kw(v: f64) -> String {
    format!("{v:.2} kW")
}

/// Formats an energy value, e.g. `"3.4 kWh"`.
pub fn format_kwh(v: f64) -> String {
    format!("{v:.1} kWh")
}
