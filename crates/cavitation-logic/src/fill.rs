//! Fill-percentage controller.
//!
//! Floods or drains the tanks at the full pump rate until the displayed
//! fill percent is within the deadband of `target_fill`.

use crate::ballast::{fill_percent, BallastStatus, BallastUnit, TickInput};
use crate::config::FillEnergyPolicy;
use crate::gate::{energy_available, EnergyPool};

/// Fill error (percentage points) within which the pump holds.
pub const FILL_DEADBAND: f32 = 1.0;

/// Buoyancy change per second in fill mode.
pub fn drain_rate(pump_rate: f32, max_buoyancy: f32) -> f32 {
    (pump_rate / 100.0) * max_buoyancy
}

/// Status and buoyancy direction for a fill error.
///
/// Flooding lowers buoyancy (-1), draining raises it (+1).
pub fn fill_action(error: f32) -> (BallastStatus, f32) {
    if error > FILL_DEADBAND {
        (BallastStatus::Flooding, -1.0)
    } else if error < -FILL_DEADBAND {
        (BallastStatus::Draining, 1.0)
    } else {
        (BallastStatus::Idle, 0.0)
    }
}

/// Run one fill-mode tick. Returns whether buoyancy was recomputed.
pub(crate) fn run(unit: &mut BallastUnit, input: &TickInput, pool: &mut impl EnergyPool) -> bool {
    if !(input.splashed && unit.pump_active) {
        unit.status = BallastStatus::Idle;
        return false;
    }

    let max_buoyancy = unit.config.max_buoyancy;
    let error = unit.target_fill - unit.fill_percent as f32;
    let increment = drain_rate(unit.pump_rate, max_buoyancy) * input.dt;

    let has_energy = energy_available(pool, unit.config.ec_requirement, input.dt);
    let gated = unit.config.fill_energy_policy == FillEnergyPolicy::Gated;

    if gated && !has_energy {
        unit.status = BallastStatus::InsufficientEnergy;
    } else {
        let (status, direction) = fill_action(error);
        unit.status = status;
        unit.buoyancy += direction * increment;
    }

    unit.buoyancy = unit.buoyancy.clamp(unit.config.min_buoyancy, max_buoyancy);
    unit.fill_percent = fill_percent(unit.buoyancy, max_buoyancy);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_rate() {
        assert!((drain_rate(10.0, 10.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_deadband() {
        assert_eq!(fill_action(1.0), (BallastStatus::Idle, 0.0));
        assert_eq!(fill_action(-1.0), (BallastStatus::Idle, 0.0));
        assert_eq!(fill_action(0.5), (BallastStatus::Idle, 0.0));
    }

    #[test]
    fn test_flood_and_drain() {
        assert_eq!(fill_action(30.0), (BallastStatus::Flooding, -1.0));
        assert_eq!(fill_action(-30.0), (BallastStatus::Draining, 1.0));
    }
}
