//! Scenario configuration
//!
//! A `Configuration` is an immutable value. Updates produce a new value via
//! [`Configuration::apply`]; nothing holds a live reference that could be
//! mutated under a running clock.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The four scalar inputs defining a scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Train A speed toward B (m/s)
    pub speed_a: f64,
    /// Train B speed toward A (m/s)
    pub speed_b: f64,
    /// Separation at t = 0 (m)
    pub initial_distance: f64,
    /// Time between the first and second whistle (s)
    pub pulse_interval: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            speed_a: 40.0,
            speed_b: 60.0,
            initial_distance: 800.0,
            pulse_interval: 1.0,
        }
    }
}

/// Partial replacement of a configuration (one slider moved, one CLI flag given)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default)]
    pub speed_a: Option<f64>,
    #[serde(default)]
    pub speed_b: Option<f64>,
    #[serde(default)]
    pub initial_distance: Option<f64>,
    #[serde(default)]
    pub pulse_interval: Option<f64>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.speed_a.is_none()
            && self.speed_b.is_none()
            && self.initial_distance.is_none()
            && self.pulse_interval.is_none()
    }
}

impl Configuration {
    pub fn new(speed_a: f64, speed_b: f64, initial_distance: f64, pulse_interval: f64) -> Self {
        Self {
            speed_a,
            speed_b,
            initial_distance,
            pulse_interval,
        }
    }

    /// Merge a patch over this configuration, returning the new value
    pub fn apply(&self, patch: &ConfigPatch) -> Self {
        Self {
            speed_a: patch.speed_a.unwrap_or(self.speed_a),
            speed_b: patch.speed_b.unwrap_or(self.speed_b),
            initial_distance: patch.initial_distance.unwrap_or(self.initial_distance),
            pulse_interval: patch.pulse_interval.unwrap_or(self.pulse_interval),
        }
    }

    /// Closing speed of the two trains
    #[inline]
    pub fn closing_speed(&self) -> f64 {
        self.speed_a + self.speed_b
    }

    /// Clamp every field into the slider range. Non-finite fields fall back to the default.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let fit = |value: f64, fallback: f64, min: f64, max: f64| {
            if value.is_finite() {
                value.clamp(min, max)
            } else {
                fallback
            }
        };

        let clamped = Self {
            speed_a: fit(self.speed_a, defaults.speed_a, SPEED_MIN, SPEED_MAX),
            speed_b: fit(self.speed_b, defaults.speed_b, SPEED_MIN, SPEED_MAX),
            initial_distance: fit(
                self.initial_distance,
                defaults.initial_distance,
                DISTANCE_MIN,
                DISTANCE_MAX,
            ),
            pulse_interval: fit(
                self.pulse_interval,
                defaults.pulse_interval,
                INTERVAL_MIN,
                INTERVAL_MAX,
            ),
        };

        if clamped != *self {
            log::warn!("Configuration {:?} clamped to {:?}", self, clamped);
        }
        clamped
    }

    /// Boundary check for configurations coming from outside (files, CLI).
    ///
    /// The solver itself accepts anything; this rejects scenarios that would
    /// make the picture meaningless, including trains that never close.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.speed_a.is_finite()
                && self.speed_b.is_finite()
                && self.initial_distance.is_finite()
                && self.pulse_interval.is_finite(),
            "configuration fields must be finite: {:?}",
            self
        );
        anyhow::ensure!(self.speed_a >= 0.0, "speed_a must be >= 0");
        anyhow::ensure!(self.speed_b >= 0.0, "speed_b must be >= 0");
        anyhow::ensure!(self.initial_distance > 0.0, "initial_distance must be > 0");
        anyhow::ensure!(self.pulse_interval > 0.0, "pulse_interval must be > 0");
        anyhow::ensure!(
            self.closing_speed() > 0.0,
            "speed_a + speed_b must be > 0 (trains never meet)"
        );
        Ok(())
    }
}
