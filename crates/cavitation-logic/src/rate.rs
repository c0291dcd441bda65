//! Pump rate scaling by part mass variant.
//!
//! Heavier variants of the same ballast part move proportionally less
//! water per second. The ratio is taken against the smallest variant mass,
//! recorded once when the unit is built.

/// Where a variant change came from. Both are handled identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantContext {
    /// Part editor, before launch.
    Editor,
    /// Live vessel in flight.
    Flight,
}

/// Effective pump rate for a variant of mass `variant_mass`.
///
/// Returns `None` when the ratio is undefined (non-finite mass, or the
/// combined mass is not positive).
pub fn scaled_pump_rate(base_mass: f32, variant_mass: f32, base_rate: f32) -> Option<f32> {
    let total = base_mass + variant_mass;
    if !variant_mass.is_finite() || !total.is_finite() || total <= 0.0 {
        return None;
    }
    Some((base_mass / total) * base_rate)
}

/// Smallest positive finite mass in a list of variant masses.
pub fn smallest_variant_mass(masses: &[f32]) -> Option<f32> {
    masses
        .iter()
        .copied()
        .filter(|m| m.is_finite() && *m > 0.0)
        .min_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_rate() {
        let rate = scaled_pump_rate(1.0, 3.0, 5.0).unwrap();
        assert!((rate - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_zero_variant_mass_keeps_base_rate() {
        let rate = scaled_pump_rate(2.0, 0.0, 8.0).unwrap();
        assert!((rate - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_heavier_is_slower() {
        let light = scaled_pump_rate(1.0, 1.0, 5.0).unwrap();
        let heavy = scaled_pump_rate(1.0, 4.0, 5.0).unwrap();
        assert!(heavy < light);
    }

    #[test]
    fn test_degenerate_masses() {
        assert_eq!(scaled_pump_rate(1.0, f32::NAN, 5.0), None);
        assert_eq!(scaled_pump_rate(1.0, -1.0, 5.0), None);
        assert_eq!(scaled_pump_rate(1.0, f32::INFINITY, 5.0), None);
    }

    #[test]
    fn test_smallest_variant_mass() {
        assert_eq!(smallest_variant_mass(&[0.8, 0.3, 1.2]), Some(0.3));
        assert_eq!(smallest_variant_mass(&[0.0, f32::NAN, 0.5]), Some(0.5));
        assert_eq!(smallest_variant_mass(&[]), None);
    }
}
