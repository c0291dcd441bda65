//! The ballast unit: state, mode switching, and per-tick dispatch.
//!
//! One [`BallastUnit`] exists per ballast part. The host calls
//! [`BallastUnit::tick`] once per physics step with the part's physical
//! state and a handle to the vessel's charge pool, then writes the
//! reported buoyancy back into its physics if `actuated` is set.
//!
//! ```
//! use cavitation_logic::ballast::{BallastStatus, BallastUnit, TickInput};
//! use cavitation_logic::config::BallastConfig;
//!
//! let mut unit = BallastUnit::new(BallastConfig::default(), 1.5, 0.5).unwrap();
//! unit.set_pump_active(true);
//! unit.set_target_depth(100.0);
//!
//! let input = TickInput { dt: 0.02, splashed: true, vertical_speed: 0.0, altitude: -5.0 };
//! let report = unit.tick(&input, &mut |amount: f32| amount);
//! assert_eq!(report.status, BallastStatus::Descending);
//! assert!(report.buoyancy < 1.5);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{validate_base_mass, validate_config, BallastConfig, ConfigError};
use crate::gate::EnergyPool;
use crate::rate::{scaled_pump_rate, VariantContext};
use crate::{depth, fill};

/// Which controller drives the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlMode {
    #[default]
    TargetDepth,
    TargetFill,
}

/// The setpoint the presentation layer should expose for editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setpoint {
    Depth,
    Fill,
}

/// Last computed ballast state, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallastStatus {
    #[default]
    Idle,
    Flooding,
    Draining,
    Ascending,
    Descending,
    InsufficientEnergy,
    AboveWaterline,
}

impl BallastStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Flooding => "Flooding",
            Self::Draining => "Draining",
            Self::Ascending => "Ascending",
            Self::Descending => "Descending",
            Self::InsufficientEnergy => "Insufficient EC",
            Self::AboveWaterline => "Above Waterline",
        }
    }
}

impl fmt::Display for BallastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Physical state supplied by the host for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Simulated seconds since the last tick, time warp included.
    pub dt: f32,
    /// Whether the part is in the water.
    pub splashed: bool,
    /// Vertical speed in m/s, positive upward.
    pub vertical_speed: f32,
    /// Altitude relative to sea level in m (negative underwater).
    pub altitude: f32,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    pub buoyancy: f32,
    pub fill_percent: i32,
    pub current_depth: i32,
    pub status: BallastStatus,
    /// Buoyancy was recomputed and should be written back to the host.
    pub actuated: bool,
}

/// User-adjustable settings, kept across save/load by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BallastSettings {
    pub mode: ControlMode,
    pub pump_active: bool,
    pub target_depth: f32,
    pub target_fill: f32,
}

/// Upper bound of the fill setpoint, in percent.
pub const MAX_TARGET_FILL: f32 = 100.0;

/// Display fill percent for a buoyancy value: 0 drained, 100 at zero buoyancy.
pub fn fill_percent(buoyancy: f32, max_buoyancy: f32) -> i32 {
    (((max_buoyancy - buoyancy) / max_buoyancy) * 100.0).round_ties_even() as i32
}

/// Displayed depth for an altitude, in whole metres.
pub fn depth_from_altitude(altitude: f32) -> i32 {
    altitude.abs().round_ties_even() as i32
}

/// Runtime state of one ballast part.
#[derive(Debug, Clone)]
pub struct BallastUnit {
    pub(crate) config: BallastConfig,
    pub(crate) base_mass: f32,
    pub(crate) buoyancy: f32,
    /// Effective pump rate after variant scaling.
    pub(crate) pump_rate: f32,
    pub(crate) mode: ControlMode,
    pub(crate) pump_active: bool,
    pub(crate) target_depth: f32,
    pub(crate) target_fill: f32,
    pub(crate) current_depth: i32,
    pub(crate) fill_percent: i32,
    pub(crate) status: BallastStatus,
}

impl BallastUnit {
    /// Build a unit from a part configuration.
    ///
    /// `starting_buoyancy` is clamped into the configured range. `base_mass`
    /// is the smallest variant mass of the part.
    pub fn new(
        config: BallastConfig,
        starting_buoyancy: f32,
        base_mass: f32,
    ) -> Result<Self, ConfigError> {
        if let Some(err) = validate_config(&config).into_iter().next() {
            return Err(err);
        }
        validate_base_mass(base_mass)?;
        if !starting_buoyancy.is_finite() {
            return Err(ConfigError::NotFinite("starting_buoyancy"));
        }

        let buoyancy = starting_buoyancy.clamp(config.min_buoyancy, config.max_buoyancy);
        Ok(Self {
            pump_rate: config.pump_rate,
            fill_percent: fill_percent(buoyancy, config.max_buoyancy),
            config,
            base_mass,
            buoyancy,
            mode: ControlMode::default(),
            pump_active: false,
            target_depth: 0.0,
            target_fill: 0.0,
            current_depth: 0,
            status: BallastStatus::Idle,
        })
    }

    /// Advance the active controller by one physics step.
    pub fn tick(&mut self, input: &TickInput, pool: &mut impl EnergyPool) -> TickReport {
        let input = TickInput {
            dt: if input.dt.is_finite() { input.dt.max(0.0) } else { 0.0 },
            ..*input
        };
        let previous = self.status;

        self.current_depth = depth_from_altitude(input.altitude);
        let actuated = match self.mode {
            ControlMode::TargetDepth => depth::run(self, &input, pool),
            ControlMode::TargetFill => fill::run(self, &input, pool),
        };

        if self.status != previous {
            log::debug!("ballast status {} -> {}", previous, self.status);
        }

        TickReport {
            buoyancy: self.buoyancy,
            fill_percent: self.fill_percent,
            current_depth: self.current_depth,
            status: self.status,
            actuated,
        }
    }

    /// Switch between depth and fill control. Setpoints are kept.
    pub fn toggle(&mut self) {
        self.mode = match self.mode {
            ControlMode::TargetDepth => ControlMode::TargetFill,
            ControlMode::TargetFill => ControlMode::TargetDepth,
        };
        log::debug!("ballast control mode now {:?}", self.mode);
    }

    /// The setpoint that belongs to the active mode.
    pub fn visible_setpoint(&self) -> Setpoint {
        match self.mode {
            ControlMode::TargetDepth => Setpoint::Depth,
            ControlMode::TargetFill => Setpoint::Fill,
        }
    }

    /// Rescale the pump rate for a new part variant.
    ///
    /// Editor and flight events share this entry point. Returns the rate in
    /// effect afterwards; an unusable mass leaves it unchanged.
    pub fn on_variant_mass_changed(&mut self, mass: f32, context: VariantContext) -> f32 {
        match scaled_pump_rate(self.base_mass, mass, self.config.pump_rate) {
            Some(rate) => {
                self.pump_rate = rate;
                log::debug!("{:?} variant mass {}: pump rate {}%/s", context, mass, rate);
            }
            None => {
                log::warn!("{:?} variant mass {} ignored: pump rate unchanged", context, mass);
            }
        }
        self.pump_rate
    }

    pub fn toggle_pump(&mut self) {
        self.pump_active = !self.pump_active;
    }

    pub fn set_pump_active(&mut self, active: bool) {
        self.pump_active = active;
    }

    /// Set the target depth, clamped to `[0, max_depth]`.
    pub fn set_target_depth(&mut self, depth: f32) {
        if depth.is_finite() {
            self.target_depth = depth.clamp(0.0, self.config.max_depth);
        }
    }

    /// Set the target fill, clamped to `[0, 100]`.
    pub fn set_target_fill(&mut self, fill: f32) {
        if fill.is_finite() {
            self.target_fill = fill.clamp(0.0, MAX_TARGET_FILL);
        }
    }

    pub fn settings(&self) -> BallastSettings {
        BallastSettings {
            mode: self.mode,
            pump_active: self.pump_active,
            target_depth: self.target_depth,
            target_fill: self.target_fill,
        }
    }

    /// Restore saved settings. Setpoints go through the clamping setters.
    pub fn apply_settings(&mut self, settings: &BallastSettings) {
        self.mode = settings.mode;
        self.pump_active = settings.pump_active;
        self.set_target_depth(settings.target_depth);
        self.set_target_fill(settings.target_fill);
    }

    pub fn config(&self) -> &BallastConfig {
        &self.config
    }

    pub fn buoyancy(&self) -> f32 {
        self.buoyancy
    }

    pub fn pump_rate(&self) -> f32 {
        self.pump_rate
    }

    pub fn base_mass(&self) -> f32 {
        self.base_mass
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn pump_active(&self) -> bool {
        self.pump_active
    }

    pub fn target_depth(&self) -> f32 {
        self.target_depth
    }

    pub fn target_fill(&self) -> f32 {
        self.target_fill
    }

    pub fn current_depth(&self) -> i32 {
        self.current_depth
    }

    pub fn fill_percent(&self) -> i32 {
        self.fill_percent
    }

    pub fn status(&self) -> BallastStatus {
        self.status
    }
}
