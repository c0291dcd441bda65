//! Depth-holding controller.
//!
//! Drives buoyancy so the part settles at `target_depth`. The pump rate is
//! throttled by a speed-limit curve that shrinks with the remaining depth
//! error, so the part eases into its target instead of overshooting. Any
//! vertical speed beyond the current limit is braked first.

use crate::ballast::{fill_percent, BallastStatus, BallastUnit, TickInput};
use crate::gate::{energy_available, EnergyPool};

/// Depth error (m) that maps to 1 m/s on the speed-limit curve.
pub const SPEED_CURVE_DIVISOR: f32 = 20.0;
/// The speed limit never drops below this, so the part never stalls.
pub const MIN_SPEED_LIMIT: f32 = 0.25;
/// Depth error (m) within which the status reads `Idle`.
pub const DEPTH_DEADBAND: f32 = 1.0;
/// Surface flush engages above this depth (m) when targeting the surface.
pub const SURFACE_FLUSH_DEPTH: i32 = 10;

/// Allowed vertical speed for the remaining depth error.
///
/// `max_speed` caps the curve but the floor wins if the cap is lower.
pub fn speed_limit(abs_error: f32, max_speed: f32) -> f32 {
    (abs_error / SPEED_CURVE_DIVISOR)
        .min(max_speed)
        .max(MIN_SPEED_LIMIT)
}

/// Buoyancy change per second at the given speed limit.
pub fn drain_rate(pump_rate: f32, max_buoyancy: f32, speed_limit: f32) -> f32 {
    (pump_rate / 100.0) * max_buoyancy * (speed_limit / 10.0)
}

/// Display status for a depth error when the pump has charge.
pub fn depth_status(error: f32) -> BallastStatus {
    if error < -DEPTH_DEADBAND {
        BallastStatus::Ascending
    } else if error > DEPTH_DEADBAND {
        BallastStatus::Descending
    } else {
        BallastStatus::Idle
    }
}

/// Sign of the buoyancy change for this tick: -1 sink, +1 rise, 0 hold.
///
/// Over-speed braking outranks closing the depth error.
pub fn approach_direction(vertical_speed: f32, speed_limit: f32, error: f32) -> f32 {
    if vertical_speed >= speed_limit {
        -1.0
    } else if vertical_speed <= -speed_limit {
        1.0
    } else if error > 0.0 {
        -1.0
    } else if error < 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Whether to keep blowing the tanks to reach the surface.
///
/// Without this the speed curve would leave the part hanging just under
/// the waterline. Only runs with the pump switched on and charge granted.
pub fn surface_flush_applies(
    target_depth: f32,
    current_depth: i32,
    buoyancy: f32,
    max_buoyancy: f32,
    pump_active: bool,
    has_energy: bool,
) -> bool {
    pump_active
        && has_energy
        && target_depth == 0.0
        && current_depth < SURFACE_FLUSH_DEPTH
        && buoyancy < max_buoyancy
}

/// Run one depth-mode tick. Returns whether buoyancy was recomputed.
pub(crate) fn run(unit: &mut BallastUnit, input: &TickInput, pool: &mut impl EnergyPool) -> bool {
    if !input.splashed {
        unit.current_depth = 0;
        unit.status = BallastStatus::AboveWaterline;
        return false;
    }

    let max_buoyancy = unit.config.max_buoyancy;
    let error = unit.target_depth - unit.current_depth as f32;
    let limit = speed_limit(error.abs(), unit.config.max_speed);
    let increment = drain_rate(unit.pump_rate, max_buoyancy, limit) * input.dt;

    // Charge is drawn even with the pump switched off.
    let has_energy = energy_available(pool, unit.config.ec_requirement, input.dt);

    if !unit.pump_active {
        unit.status = BallastStatus::Idle;
        return false;
    }

    if has_energy {
        unit.status = depth_status(error);
        unit.buoyancy += approach_direction(input.vertical_speed, limit, error) * increment;
    } else {
        unit.status = BallastStatus::InsufficientEnergy;
    }

    if surface_flush_applies(
        unit.target_depth,
        unit.current_depth,
        unit.buoyancy,
        max_buoyancy,
        unit.pump_active,
        has_energy,
    ) {
        unit.buoyancy += increment;
    }

    unit.buoyancy = unit.buoyancy.clamp(unit.config.min_buoyancy, max_buoyancy);
    unit.fill_percent = fill_percent(unit.buoyancy, max_buoyancy);
    true
}
