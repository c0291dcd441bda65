//! Electric charge gating for the ballast pumps.
//!
//! The pumps draw from a vessel-wide charge pool owned by the host. A
//! request can come back short when the pool is low or shared with other
//! consumers; that is an ordinary outcome, never an error.

/// Source of electric charge for a tick.
///
/// `request_energy` removes up to `amount` from the pool and returns how
/// much was actually granted. It must return immediately.
pub trait EnergyPool {
    fn request_energy(&mut self, amount: f32) -> f32;
}

impl<F> EnergyPool for F
where
    F: FnMut(f32) -> f32,
{
    fn request_energy(&mut self, amount: f32) -> f32 {
        self(amount)
    }
}

/// Fraction of the requested drain that must be granted to run the pump.
pub const GRANT_THRESHOLD: f32 = 0.95;

/// Request `demand_rate * dt` charge and report whether enough was granted.
pub fn energy_available(pool: &mut impl EnergyPool, demand_rate: f32, dt: f32) -> bool {
    let drain = demand_rate * dt;
    let granted = pool.request_energy(drain);
    granted >= drain * GRANT_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_grant() {
        let mut pool = |amount: f32| amount;
        assert!(energy_available(&mut pool, 2.0, 0.5));
    }

    #[test]
    fn test_requests_rate_times_dt() {
        let mut requested = 0.0;
        let mut pool = |amount: f32| {
            requested = amount;
            amount
        };
        energy_available(&mut pool, 4.0, 0.25);
        assert!((requested - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut pool = |amount: f32| amount * GRANT_THRESHOLD;
        assert!(energy_available(&mut pool, 1.0, 1.0));
    }

    #[test]
    fn test_partial_grant_below_threshold() {
        let mut pool = |amount: f32| amount * 0.94;
        assert!(!energy_available(&mut pool, 1.0, 1.0));
    }

    #[test]
    fn test_empty_pool() {
        let mut pool = |_: f32| 0.0;
        assert!(!energy_available(&mut pool, 0.5, 0.02));
    }

    #[test]
    fn test_zero_demand_always_available() {
        let mut pool = |_: f32| 0.0;
        assert!(energy_available(&mut pool, 0.0, 0.02));
    }
}
