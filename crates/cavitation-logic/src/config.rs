//! Ballast part configuration, validation, and the part info summary.
//!
//! A ballast part is described by a handful of numbers read from the part
//! definition. They never change at runtime. Everything here is checked
//! once, before a [`BallastUnit`](crate::ballast::BallastUnit) is built, so
//! the controllers can divide by `max_buoyancy` without further guards.
//!
//! ```
//! use cavitation_logic::config::{validate_config, BallastConfig};
//!
//! let config = BallastConfig::default();
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether fill mode is allowed to pump without enough electric charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillEnergyPolicy {
    /// Fill mode checks the charge but pumps regardless.
    #[default]
    Ungated,
    /// Fill mode stops pumping when the charge request comes up short.
    Gated,
}

/// Static configuration of one ballast part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallastConfig {
    /// Lowest buoyancy the tanks can reach (fully flooded).
    pub min_buoyancy: f32,
    /// Highest buoyancy the tanks can reach (fully drained). Must be non-zero.
    pub max_buoyancy: f32,
    /// Cap on the approach speed in depth mode, m/s.
    pub max_speed: f32,
    /// Deepest selectable target depth, m.
    pub max_depth: f32,
    /// Percent of the buoyancy range moved per second at full effectiveness.
    pub pump_rate: f32,
    /// Electric charge consumed per second while pumping.
    pub ec_requirement: f32,
    #[serde(default)]
    pub fill_energy_policy: FillEnergyPolicy,
}

impl Default for BallastConfig {
    fn default() -> Self {
        Self {
            min_buoyancy: 0.0,
            max_buoyancy: 1.5,
            max_speed: 2.0,
            max_depth: 2000.0,
            pump_rate: 5.0,
            ec_requirement: 0.5,
            fill_energy_policy: FillEnergyPolicy::Ungated,
        }
    }
}

impl BallastConfig {
    /// Human-readable part summary shown in the part info panel.
    pub fn info(&self) -> String {
        format!(
            "Descent/Ascent Velocity: {}m/s\n\
             Maximum Depth: {}m\n\
             Buoyancy Range: {} - {}\n\
             Pump Rate: {}%/s (Base)\n\
             \n\
             Requires {}ec/s when pumping",
            self.max_speed,
            self.max_depth,
            self.min_buoyancy,
            self.max_buoyancy,
            self.pump_rate,
            self.ec_requirement,
        )
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A field is NaN or infinite.
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
    /// Buoyancy range is inverted.
    #[error("min_buoyancy {min} is greater than max_buoyancy {max}")]
    InvertedBuoyancyRange { min: f32, max: f32 },
    /// Fill percent is computed relative to max buoyancy.
    #[error("max_buoyancy must not be zero")]
    ZeroMaxBuoyancy,
    /// Approach speed cap below zero.
    #[error("max_speed must not be negative, got {0}")]
    NegativeMaxSpeed(f32),
    /// Depth limit below zero.
    #[error("max_depth must not be negative, got {0}")]
    NegativeMaxDepth(f32),
    /// Pump rate below zero.
    #[error("pump_rate must not be negative, got {0}")]
    NegativePumpRate(f32),
    /// Charge demand below zero.
    #[error("ec_requirement must not be negative, got {0}")]
    NegativeEcRequirement(f32),
    /// Base mass feeds the variant pump-rate ratio.
    #[error("base mass must be a positive finite number, got {0}")]
    InvalidBaseMass(f32),
}

/// Validate a ballast configuration, returning all errors found.
pub fn validate_config(config: &BallastConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let fields = [
        ("min_buoyancy", config.min_buoyancy),
        ("max_buoyancy", config.max_buoyancy),
        ("max_speed", config.max_speed),
        ("max_depth", config.max_depth),
        ("pump_rate", config.pump_rate),
        ("ec_requirement", config.ec_requirement),
    ];
    for (name, value) in fields {
        if !value.is_finite() {
            errors.push(ConfigError::NotFinite(name));
        }
    }
    // Range checks below are meaningless on NaN/inf input.
    if !errors.is_empty() {
        return errors;
    }

    if config.min_buoyancy > config.max_buoyancy {
        errors.push(ConfigError::InvertedBuoyancyRange {
            min: config.min_buoyancy,
            max: config.max_buoyancy,
        });
    }
    if config.max_buoyancy == 0.0 {
        errors.push(ConfigError::ZeroMaxBuoyancy);
    }
    if config.max_speed < 0.0 {
        errors.push(ConfigError::NegativeMaxSpeed(config.max_speed));
    }
    if config.max_depth < 0.0 {
        errors.push(ConfigError::NegativeMaxDepth(config.max_depth));
    }
    if config.pump_rate < 0.0 {
        errors.push(ConfigError::NegativePumpRate(config.pump_rate));
    }
    if config.ec_requirement < 0.0 {
        errors.push(ConfigError::NegativeEcRequirement(config.ec_requirement));
    }

    errors
}

/// Validate the mass recorded as the smallest variant at construction.
pub fn validate_base_mass(base_mass: f32) -> Result<(), ConfigError> {
    if base_mass.is_finite() && base_mass > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidBaseMass(base_mass))
    }
}
