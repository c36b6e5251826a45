//! Positions at a given simulation time
//!
//! Pure functions of `(config, t)`; the renderer reads these every frame.

use super::config::Configuration;
use super::solver::{PulseId, Solution};
use crate::consts::SOUND_SPEED;

/// Train A position (m from its start)
#[inline]
pub fn train_a_position(config: &Configuration, t: f64) -> f64 {
    config.speed_a * t
}

/// Train B position (m from train A's start)
#[inline]
pub fn train_b_position(config: &Configuration, t: f64) -> f64 {
    config.initial_distance - config.speed_b * t
}

/// Whistle front position, extrapolated from its emission point.
///
/// Only meaningful between emission and reception; see [`Projection::pulses`].
#[inline]
pub fn pulse_position(pulse: PulseId, config: &Configuration, t: f64) -> f64 {
    pulse.emission_position(config) + SOUND_SPEED * (t - pulse.emission_time(config))
}

/// Snapshot of every moving thing at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub time: f64,
    pub train_a: f64,
    pub train_b: f64,
    /// Front position per pulse (indexed by emission order), `None` when not in flight
    pub pulses: [Option<f64>; 2],
    /// Trains have met; post-collision positions are not physical
    pub collided: bool,
}

impl Projection {
    pub fn pulse(&self, pulse: PulseId) -> Option<f64> {
        self.pulses[pulse.index()]
    }

    /// A pulse has been emitted (its emission marker is visible)
    pub fn emitted(pulse: PulseId, config: &Configuration, t: f64) -> bool {
        t >= pulse.emission_time(config)
    }
}

/// Project the scenario at time `t`
pub fn project(config: &Configuration, solution: &Solution, t: f64) -> Projection {
    let in_flight = |pulse: PulseId| {
        let emitted = pulse.emission_time(config);
        let received = solution.impact(pulse).time;
        (t >= emitted && t < received).then(|| pulse_position(pulse, config, t))
    };

    Projection {
        time: t,
        train_a: train_a_position(config, t),
        train_b: train_b_position(config, t),
        pulses: [in_flight(PulseId::First), in_flight(PulseId::Second)],
        collided: t >= solution.collision_time,
    }
}
