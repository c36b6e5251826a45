//! Doppler Trains - two trains on one track, two whistle pulses
//!
//! Core modules:
//! - `sim`: Closed-form pulse solver, position projection, playback clock
//! - `report`: Run summary (reception times, received interval)
//! - `scene`: Per-frame scene description and SVG output
//! - `platform`: Frame scheduling (synthetic native frames, browser animation frames)
//! - `settings`: Persisted preferences

pub mod platform;
pub mod report;
pub mod scene;
pub mod settings;
pub mod sim;

pub use report::Summary;
pub use settings::Settings;
pub use sim::{Configuration, PlaybackDriver, Simulation, Solution, solve};

/// Simulation configuration constants
pub mod consts {
    /// Pulse propagation speed (sound in air, m/s)
    pub const SOUND_SPEED: f64 = 340.0;
    /// Extra time after the last event before the timeline ends (s)
    pub const END_MARGIN: f64 = 0.5;
    /// Delay between the run finishing and the summary popping up (ms)
    pub const SUMMARY_DELAY_MS: u32 = 500;

    /// Slider bounds. Presentation limits, not physical requirements.
    pub const SPEED_MIN: f64 = 0.0;
    pub const SPEED_MAX: f64 = 150.0;
    pub const SPEED_STEP: f64 = 1.0;
    pub const DISTANCE_MIN: f64 = 100.0;
    pub const DISTANCE_MAX: f64 = 1000.0;
    pub const DISTANCE_STEP: f64 = 50.0;
    pub const INTERVAL_MIN: f64 = 0.1;
    pub const INTERVAL_MAX: f64 = 3.0;
    pub const INTERVAL_STEP: f64 = 0.1;

    /// How long the whistle ring stays on train A after an emission (s)
    pub const WHISTLE_RING_WINDOW: f64 = 0.1;
    /// How long the impact ring stays on train B after a reception (s)
    pub const IMPACT_RING_WINDOW: f64 = 0.8;
}

/// Relative floating point comparison (scale floor of 1.0 so values near zero compare absolutely)
#[inline]
pub fn approx_eq(a: f64, b: f64, rel: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= rel * scale
}
