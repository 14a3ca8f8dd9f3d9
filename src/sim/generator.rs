//! The step function: previous sample + timestamp + randomness -> next sample.

use chrono::{FixedOffset, Offset, Utc};
use rand::Rng;

use crate::devices::{BaseLoad, Battery, EvController, HeatPump, SolarPv, Source, StepContext};

use super::integrator::step_hours;
use super::power_balance;
use super::types::SimulationState;

/// Composition of the source/load models, EV controller, power balance and
/// integrator.
///
/// Holds typed model fields rather than trait objects since the device set is
/// fixed. `step` borrows `self` immutably: the generator carries no state
/// between steps, so a run is fully determined by its timestamps, the first
/// previous sample and the RNG.
#[derive(Debug, Clone)]
pub struct Generator {
    offset: FixedOffset,
    solar: SolarPv,
    base_load: BaseLoad,
    heat_pump: HeatPump,
    ev: EvController,
    battery: Battery,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl Generator {
    /// Creates a generator with the household's fixed model constants.
    ///
    /// # Arguments
    ///
    /// * `offset` - UTC offset used to derive the local hour of day
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            solar: SolarPv::default(),
            base_load: BaseLoad::default(),
            heat_pump: HeatPump::default(),
            ev: EvController::default(),
            battery: Battery::default(),
        }
    }

    /// UTC offset used for the hour of day.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Time-derived context for `time_ms` in this generator's offset.
    pub fn context(&self, time_ms: i64) -> StepContext {
        StepContext::new(time_ms, &self.offset)
    }

    /// Produces the sample at `time_ms`.
    ///
    /// With `prev = None` the step bootstraps: battery SOC starts at 60 %, EV
    /// SOC is drawn from `50 + U(0, 20)`, counters start at zero and the step
    /// length is one minute.
    ///
    /// Random draws happen in a fixed order: PV noise, base-load noise,
    /// heat-pump noise, bootstrap EV SOC (only without `prev`), V2H jitter
    /// (only when the evening rule fires).
    pub fn step<R: Rng + ?Sized>(
        &self,
        time_ms: i64,
        prev: Option<&SimulationState>,
        rng: &mut R,
    ) -> SimulationState {
        let context = self.context(time_ms);

        // 1. Sources and loads from the absolute timestamp
        let pv = self.solar.power_kw(&context, rng);
        let load_base = self.base_load.power_kw(&context, rng);
        let heat_pump = self.heat_pump.power_kw(&context, rng);

        // 2. EV decision against the previous SOC
        let prev_ev_soc = match prev {
            Some(p) => p.ev_soc,
            None => self.ev.bootstrap_soc(rng),
        };
        let ev = self.ev.decide(&context, prev_ev_soc, rng);

        // 3. Balance surplus / deficit across battery and grid
        let prev_battery_soc = prev.map_or(self.battery.bootstrap_soc, |p| p.battery_soc);
        let balance = power_balance::resolve(
            pv,
            load_base,
            heat_pump,
            ev.power_kw,
            prev_battery_soc,
            &self.battery,
        );

        // 4. Integrate SOC and counters
        let dt_hours = step_hours(time_ms, prev.map(|p| p.time));
        let battery_soc = self
            .battery
            .next_soc(prev_battery_soc, balance.battery_kw, dt_hours);
        let ev_soc = self.ev.next_soc(prev_ev_soc, ev.power_kw, dt_hours);
        let energy = prev
            .map(SimulationState::energy)
            .unwrap_or_default()
            .advance(pv, balance.grid_kw, ev.power_kw, dt_hours);

        SimulationState {
            time: time_ms,
            pv,
            load_base,
            heat_pump,
            ev_power: ev.power_kw,
            ev_soc,
            battery_soc,
            battery_power: balance.battery_kw,
            grid: balance.grid_kw,
            pv_energy: energy.pv_kwh,
            grid_import_energy: energy.grid_import_kwh,
            grid_export_energy: energy.grid_export_kwh,
            ev_charge_energy: energy.ev_charge_kwh,
            ev_discharge_energy: energy.ev_discharge_kwh,
            load_total: balance.load_total_kw,
        }
    }
}
