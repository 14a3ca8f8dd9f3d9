//! Source, load and storage models for one household.

/// Household base-load profile.
pub mod baseload;
/// Stationary battery storage limits.
pub mod battery;
/// Rule-based EV charge / V2H controller.
pub mod ev;
/// Heat-pump duty-cycle model.
pub mod heat_pump;
/// Solar photovoltaic generation model.
pub mod solar;
pub mod types;

// Re-export the main types for convenience
pub use baseload::BaseLoad;
pub use battery::Battery;
pub use ev::{EvController, EvDecision, EvRule};
pub use heat_pump::HeatPump;
pub use solar::SolarPv;
pub use types::Source;
pub use types::StepContext;
