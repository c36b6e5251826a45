//! Deterministic simulation module
//!
//! Everything the presentation layer reads comes from here. This module must be pure:
//! - Positions are closed-form functions of time, never stepped
//! - The only mutable state is the playback clock
//! - No rendering or platform dependencies

pub mod config;
pub mod playback;
pub mod projection;
pub mod session;
pub mod solver;

pub use config::{ConfigPatch, Configuration};
pub use playback::{PlaybackDriver, PlaybackEvent, PlaybackPhase};
pub use projection::{Projection, project, pulse_position, train_a_position, train_b_position};
pub use session::{SimEvent, Simulation};
pub use solver::{ImpactRecord, PulseId, Solution, solve};
