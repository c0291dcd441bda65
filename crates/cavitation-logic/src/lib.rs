//! Pure ballast controller logic for Cavitation.
//!
//! This crate contains the ballast pump logic independent of any game
//! engine or host simulation. The host passes in the part's physical state
//! and a handle to its charge pool each tick, and gets back the buoyancy to
//! apply and a status for display. Nothing here reaches for global state,
//! so every rule is unit-testable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`ballast`] | Ballast unit state, mode switch, per-tick dispatch |
//! | [`config`] | Part configuration, validation, info summary |
//! | [`depth`] | Depth-holding controller with speed-limit curve |
//! | [`fill`] | Fill-percentage controller with deadband |
//! | [`gate`] | Electric charge gating against the vessel pool |
//! | [`rate`] | Pump rate scaling by mass variant |

pub mod ballast;
pub mod config;
pub mod depth;
pub mod fill;
pub mod gate;
pub mod rate;
