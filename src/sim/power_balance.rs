//! Household power balance: battery first, grid as the term of last resort.

use crate::devices::Battery;

/// Result of balancing one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balance {
    /// `load_base + heat_pump + max(0, ev)` (kW).
    pub load_total_kw: f64,
    /// Total load offset by EV discharge: `load_total + min(0, ev)` (kW).
    pub effective_load_kw: f64,
    /// `pv - effective_load` (kW); positive = surplus, negative = deficit.
    pub surplus_kw: f64,
    /// Battery power (kW; positive = charge, negative = discharge).
    pub battery_kw: f64,
    /// Grid power (kW; positive = import, negative = export).
    pub grid_kw: f64,
}

/// Household load seen by the balance: `load_base + heat_pump + max(0, ev_kw)`.
pub fn load_total_kw(load_base_kw: f64, heat_pump_kw: f64, ev_kw: f64) -> f64 {
    load_base_kw + heat_pump_kw + ev_kw.max(0.0)
}

/// Resolves surplus or deficit across battery and grid.
///
/// On surplus the battery charges up to its SOC-proportional headroom and the
/// remainder is exported. On deficit (including exactly zero) the battery
/// discharges up to its SOC-proportional capacity and the remainder is
/// imported. The grid is never importing and exporting in the same step.
///
/// # Arguments
///
/// * `pv_kw` - PV generation
/// * `load_base_kw` - Household baseline consumption
/// * `heat_pump_kw` - Heat-pump consumption
/// * `ev_kw` - EV power (positive = charging, negative = V2H)
/// * `prev_battery_soc` - Battery SOC before the step (%)
/// * `battery` - Battery rate model
pub fn resolve(
    pv_kw: f64,
    load_base_kw: f64,
    heat_pump_kw: f64,
    ev_kw: f64,
    prev_battery_soc: f64,
    battery: &Battery,
) -> Balance {
    let load_total_kw = load_total_kw(load_base_kw, heat_pump_kw, ev_kw);
    let effective_load_kw = load_total_kw + ev_kw.min(0.0);
    let surplus_kw = pv_kw - effective_load_kw;

    let (battery_kw, grid_kw) = if surplus_kw > 0.0 {
        let charge = surplus_kw.min(battery.can_charge_kw(prev_battery_soc));
        (charge, -(surplus_kw - charge).max(0.0))
    } else {
        let discharge = (-surplus_kw).min(battery.can_discharge_kw(prev_battery_soc));
        (-discharge, -surplus_kw - discharge)
    };

    Balance {
        load_total_kw,
        effective_load_kw,
        surplus_kw,
        battery_kw,
        grid_kw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn surplus_charges_battery_then_exports() {
        // surplus = 5 - 1.6 = 3.4, headroom = 4 * 0.4 = 1.6
        let b = resolve(5.0, 0.6, 1.0, 0.0, 60.0, &Battery::default());
        assert!(close(b.surplus_kw, 3.4));
        assert!(close(b.battery_kw, 1.6));
        assert!(close(b.grid_kw, -1.8));
    }

    #[test]
    fn deficit_discharges_battery_then_imports() {
        // surplus = -2, capacity = 4 * 0.1 = 0.4
        let b = resolve(0.0, 1.0, 1.0, 0.0, 10.0, &Battery::default());
        assert!(close(b.surplus_kw, -2.0));
        assert!(close(b.battery_kw, -0.4));
        assert!(close(b.grid_kw, 1.6));
    }

    #[test]
    fn small_surplus_fully_absorbed() {
        let b = resolve(2.0, 0.5, 1.0, 0.0, 20.0, &Battery::default());
        assert!(close(b.battery_kw, 0.5));
        assert_eq!(b.grid_kw, 0.0);
    }

    #[test]
    fn full_battery_exports_everything() {
        let b = resolve(4.0, 0.5, 0.5, 0.0, 100.0, &Battery::default());
        assert_eq!(b.battery_kw, 0.0);
        assert!(close(b.grid_kw, -3.0));
    }

    #[test]
    fn zero_surplus_is_a_deficit_branch() {
        let b = resolve(1.5, 0.5, 1.0, 0.0, 50.0, &Battery::default());
        assert_eq!(b.surplus_kw, 0.0);
        assert_eq!(b.battery_kw, 0.0);
        assert_eq!(b.grid_kw, 0.0);
    }

    #[test]
    fn ev_charging_adds_to_load() {
        let b = resolve(0.0, 0.5, 1.0, 3.0, 5.0, &Battery::default());
        assert!(close(b.load_total_kw, 4.5));
        assert!(close(b.effective_load_kw, 4.5));
        // capacity = 4 * 0.05 = 0.2
        assert!(close(b.battery_kw, -0.2));
        assert!(close(b.grid_kw, 4.3));
    }

    #[test]
    fn ev_discharge_offsets_load() {
        // load_total = 1.5, effective = 1.5 - 2.0 = -0.5, surplus = 0.5
        let b = resolve(0.0, 0.5, 1.0, -2.0, 50.0, &Battery::default());
        assert!(close(b.load_total_kw, 1.5));
        assert!(close(b.effective_load_kw, -0.5));
        assert!(close(b.surplus_kw, 0.5));
        assert!(close(b.battery_kw, 0.5));
        assert_eq!(b.grid_kw, 0.0);
    }

    #[test]
    fn grid_never_imports_and_exports() {
        let battery = Battery::default();
        for pv in [0.0, 1.0, 3.0, 6.0] {
            for soc in [5.0, 50.0, 100.0] {
                let b = resolve(pv, 0.6, 1.2, 0.0, soc, &battery);
                assert!(b.battery_kw <= battery.can_charge_kw(soc) + 1e-12);
                assert!(-b.battery_kw <= battery.can_discharge_kw(soc) + 1e-12);
                if b.surplus_kw > 0.0 {
                    assert!(b.grid_kw <= 0.0);
                } else {
                    assert!(b.grid_kw >= 0.0);
                }
            }
        }
    }
}
