//! Frame scene description
//!
//! Turns `(config, solution, t)` into a flat list of drawable elements in
//! view-box coordinates. No drawing happens here; [`svg`] serializes a scene.

pub mod svg;

pub use svg::to_svg;

use glam::Vec2;

use crate::consts::{IMPACT_RING_WINDOW, WHISTLE_RING_WINDOW};
use crate::sim::{Configuration, Projection, PulseId, Solution, project};

/// View box size
pub const VIEW_WIDTH: f32 = 1000.0;
pub const VIEW_HEIGHT: f32 = 400.0;
/// Horizontal padding; the initial separation spans the rest of the width
pub const PADDING: f32 = 100.0;
/// Track centerline
pub const TRACK_Y: f32 = 200.0;

/// Colors
pub mod palette {
    pub const PULSE_1: &str = "#fb923c";
    pub const PULSE_2: &str = "#2dd4bf";
    pub const TRAIN_A: &str = "#3b82f6";
    pub const TRAIN_B: &str = "#22c55e";
    pub const COLLISION: &str = "#f43f5e";
    pub const TRACK: &str = "#475569";
    pub const TRACK_DASH: &str = "#1e293b";
    pub const PANEL: &str = "#1e293b";
}

pub fn pulse_color(pulse: PulseId) -> &'static str {
    match pulse {
        PulseId::First => palette::PULSE_1,
        PulseId::Second => palette::PULSE_2,
    }
}

/// Meters to view-box mapping for one configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    scale: f32,
}

impl Layout {
    pub fn for_config(config: &Configuration) -> Self {
        let distance = config.initial_distance as f32;
        let scale = if distance > 0.0 {
            (VIEW_WIDTH - 2.0 * PADDING) / distance
        } else {
            1.0
        };
        Self { scale }
    }

    /// View-box x for a track position in meters
    #[inline]
    pub fn x(&self, meters: f64) -> f32 {
        PADDING + meters as f32 * self.scale
    }

    /// Point on the track
    #[inline]
    pub fn on_track(&self, meters: f64) -> Vec2 {
        Vec2::new(self.x(meters), TRACK_Y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainSide {
    /// Left train, whistling
    A,
    /// Right train, listening
    B,
}

impl TrainSide {
    pub fn label(&self) -> &'static str {
        match self {
            TrainSide::A => "Train A",
            TrainSide::B => "Train B",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            TrainSide::A => palette::TRAIN_A,
            TrainSide::B => palette::TRAIN_B,
        }
    }
}

/// A drawable element, positioned in view-box space
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Track,
    /// Where a pulse left train A
    EmissionMarker {
        pulse: PulseId,
        at: Vec2,
        position_m: f64,
    },
    Train {
        side: TrainSide,
        at: Vec2,
        speed: f64,
    },
    /// Ring on train A right after it whistles
    WhistleRing { pulse: PulseId, at: Vec2 },
    /// Ring on train B right after it hears a pulse
    ImpactRing {
        pulse: PulseId,
        at: Vec2,
        radius: f32,
    },
    CollisionMarker { at: Vec2, time: f64 },
    /// A pulse front in flight
    PulseFront { pulse: PulseId, at: Vec2 },
    /// Callout at a reception point
    ImpactMarker {
        pulse: PulseId,
        at: Vec2,
        y_offset: f32,
        time: f64,
    },
}

/// Reception tick on the timeline scrubber
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineMarker {
    pub pulse: PulseId,
    /// 0.0 = start, 1.0 = end of the timeline
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub time: f64,
    pub elements: Vec<Element>,
    pub timeline: [TimelineMarker; 2],
}

impl Scene {
    pub fn count(&self, pred: impl Fn(&Element) -> bool) -> usize {
        self.elements.iter().filter(|e| pred(*e)).count()
    }
}

fn impact_ring_radius(pulse: PulseId) -> f32 {
    match pulse {
        PulseId::First => 30.0,
        PulseId::Second => 40.0,
    }
}

fn impact_marker_offset(pulse: PulseId) -> f32 {
    match pulse {
        PulseId::First => -110.0,
        PulseId::Second => -70.0,
    }
}

/// Build the scene for time `t`. Back-to-front draw order.
pub fn build(config: &Configuration, solution: &Solution, t: f64) -> Scene {
    let layout = Layout::for_config(config);
    let proj: Projection = project(config, solution, t);
    let mut elements = Vec::with_capacity(16);

    elements.push(Element::Track);

    for pulse in PulseId::ALL {
        if Projection::emitted(pulse, config, t) {
            let position_m = pulse.emission_position(config);
            elements.push(Element::EmissionMarker {
                pulse,
                at: layout.on_track(position_m),
                position_m,
            });
        }
    }

    // Trains are replaced by the collision marker once they meet
    if !proj.collided {
        let a = layout.on_track(proj.train_a);
        elements.push(Element::Train {
            side: TrainSide::A,
            at: a,
            speed: config.speed_a,
        });
        for pulse in PulseId::ALL {
            if (t - pulse.emission_time(config)).abs() < WHISTLE_RING_WINDOW {
                elements.push(Element::WhistleRing { pulse, at: a });
            }
        }

        let b = layout.on_track(proj.train_b);
        elements.push(Element::Train {
            side: TrainSide::B,
            at: b,
            speed: config.speed_b,
        });
        for pulse in PulseId::ALL {
            let heard = solution.impact(pulse).time;
            if t >= heard && t - heard < IMPACT_RING_WINDOW {
                elements.push(Element::ImpactRing {
                    pulse,
                    at: b,
                    radius: impact_ring_radius(pulse),
                });
            }
        }
    } else if let Some(meeting) = solution.collision_position(config) {
        elements.push(Element::CollisionMarker {
            at: layout.on_track(meeting),
            time: solution.collision_time,
        });
    }

    // A front sitting on its emitter has no extent yet; draw it once it has left
    for pulse in PulseId::ALL {
        if t <= pulse.emission_time(config) {
            continue;
        }
        if let Some(front) = proj.pulse(pulse) {
            elements.push(Element::PulseFront {
                pulse,
                at: layout.on_track(front),
            });
        }
    }

    for imp in &solution.impacts {
        if t >= imp.time {
            elements.push(Element::ImpactMarker {
                pulse: imp.pulse,
                at: layout.on_track(imp.position),
                y_offset: impact_marker_offset(imp.pulse),
                time: imp.time,
            });
        }
    }

    let marker = |i: usize| TimelineMarker {
        pulse: solution.impacts[i].pulse,
        fraction: solution.timeline_fraction(solution.impacts[i].time),
    };

    Scene {
        time: t,
        elements,
        timeline: [marker(0), marker(1)],
    }
}
