//! Closed-form pulse reception solver
//!
//! Train A starts at x = 0 moving right at `speed_a`, train B starts at
//! `initial_distance` moving left at `speed_b`. Train A whistles at t = 0 and
//! again at t = `pulse_interval`; each whistle travels right at
//! [`SOUND_SPEED`]. A reception is the instant a whistle front meets train B:
//!
//! ```text
//! pulse 1:  V·t                    = D − vB·t   =>  t1 = D / (V + vB)
//! pulse 2:  vA·Δ + V·(t − Δ)       = D − vB·t   =>  t2 = (D + Δ·(V − vA)) / (V + vB)
//! ```

use serde::{Deserialize, Serialize};

use super::config::Configuration;
use crate::consts::{END_MARGIN, SOUND_SPEED};

/// Which whistle a record describes (by emission, not by arrival order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PulseId {
    First,
    Second,
}

impl PulseId {
    pub const ALL: [PulseId; 2] = [PulseId::First, PulseId::Second];

    pub fn label(&self) -> &'static str {
        match self {
            PulseId::First => "Pulse 1",
            PulseId::Second => "Pulse 2",
        }
    }

    /// Short tag drawn next to the pulse front
    pub fn tag(&self) -> &'static str {
        match self {
            PulseId::First => "S1",
            PulseId::Second => "S2",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            PulseId::First => 0,
            PulseId::Second => 1,
        }
    }

    /// Simulation time at which train A emits this pulse
    pub fn emission_time(&self, config: &Configuration) -> f64 {
        match self {
            PulseId::First => 0.0,
            PulseId::Second => config.pulse_interval,
        }
    }

    /// Where train A is when it emits this pulse
    pub fn emission_position(&self, config: &Configuration) -> f64 {
        config.speed_a * self.emission_time(config)
    }
}

/// A pulse reaching train B
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactRecord {
    pub pulse: PulseId,
    /// Simulation time of reception (s)
    pub time: f64,
    /// Distance from train A's start point (m)
    pub position: f64,
}

/// Everything derived from one configuration. Never mutated after `solve`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Receptions sorted ascending by time (ties keep emission order)
    pub impacts: [ImpactRecord; 2],
    /// When the trains meet; `f64::INFINITY` if they never close
    pub collision_time: f64,
    /// Timeline length: latest event plus [`END_MARGIN`]
    pub max_duration: f64,
}

impl Solution {
    /// Earliest reception
    pub fn first(&self) -> &ImpactRecord {
        &self.impacts[0]
    }

    /// Latest reception
    pub fn last(&self) -> &ImpactRecord {
        &self.impacts[1]
    }

    /// Look up a reception by emission identity
    pub fn impact(&self, pulse: PulseId) -> &ImpactRecord {
        if self.impacts[0].pulse == pulse {
            &self.impacts[0]
        } else {
            &self.impacts[1]
        }
    }

    /// Interval between the two receptions as heard on train B
    pub fn received_interval(&self) -> f64 {
        (self.impacts[1].time - self.impacts[0].time).abs()
    }

    /// Whether the trains ever meet
    pub fn has_collision(&self) -> bool {
        self.collision_time.is_finite()
    }

    /// Meeting point of the two trains, if they ever meet
    pub fn collision_position(&self, config: &Configuration) -> Option<f64> {
        self.has_collision().then(|| config.speed_a * self.collision_time)
    }

    /// Position of `time` along the timeline, in [0, 1]
    pub fn timeline_fraction(&self, time: f64) -> f64 {
        if self.max_duration > 0.0 {
            (time / self.max_duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

fn impact_for(pulse: PulseId, config: &Configuration) -> ImpactRecord {
    let closing = SOUND_SPEED + config.speed_b;
    let time = match pulse {
        PulseId::First => config.initial_distance / closing,
        PulseId::Second => {
            (config.initial_distance + config.pulse_interval * (SOUND_SPEED - config.speed_a))
                / closing
        }
    };
    ImpactRecord {
        pulse,
        time,
        position: config.initial_distance - config.speed_b * time,
    }
}

/// Solve a configuration. Pure and cheap; safe to call every frame.
///
/// Trains that never close (`speed_a + speed_b <= 0`) get an infinite
/// collision time, and the timeline then ends after the last reception.
pub fn solve(config: &Configuration) -> Solution {
    let mut impacts = [
        impact_for(PulseId::First, config),
        impact_for(PulseId::Second, config),
    ];
    // Stable sort: simultaneous arrivals keep pulse 1 first
    impacts.sort_by(|a, b| a.time.total_cmp(&b.time));

    let closing = config.closing_speed();
    let collision_time = if closing > 0.0 {
        config.initial_distance / closing
    } else {
        f64::INFINITY
    };

    let last_event = if collision_time.is_finite() {
        impacts[1].time.max(collision_time)
    } else {
        impacts[1].time
    };

    Solution {
        impacts,
        collision_time,
        max_duration: last_event + END_MARGIN,
    }
}
