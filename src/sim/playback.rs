//! Playback clock
//!
//! Owns the simulation time and the play flag. Time is advanced by real frame
//! deltas while playing, or set directly by scrubbing. The driver never
//! assumes a frame rate: [`PlaybackDriver::tick`] takes a host timestamp and
//! [`PlaybackDriver::advance`] takes a raw delta, so tests can feed synthetic
//! frames without a timer.

use serde::{Deserialize, Serialize};

/// Where the clock is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// t = 0, not advancing
    StoppedAtStart,
    /// Advancing with real time
    Playing,
    /// Held somewhere inside the timeline
    Paused,
    /// Parked at the end of the timeline
    Finished,
}

/// Signals the presentation layer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// The clock just reached the end of the timeline
    Finished,
}

#[derive(Debug, Clone)]
pub struct PlaybackDriver {
    current_time: f64,
    playing: bool,
    max_duration: f64,
    /// Host timestamp of the previous tick (ms). Cleared on every transition
    /// into or out of Playing so the next tick is a zero-delta baseline.
    last_timestamp: Option<f64>,
}

impl PlaybackDriver {
    pub fn new(max_duration: f64) -> Self {
        Self {
            current_time: 0.0,
            playing: false,
            max_duration: max_duration.max(0.0),
            last_timestamp: None,
        }
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn max_duration(&self) -> f64 {
        self.max_duration
    }

    pub fn phase(&self) -> PlaybackPhase {
        if self.playing {
            PlaybackPhase::Playing
        } else if self.current_time <= 0.0 {
            PlaybackPhase::StoppedAtStart
        } else if self.current_time >= self.max_duration {
            PlaybackPhase::Finished
        } else {
            PlaybackPhase::Paused
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == PlaybackPhase::Finished
    }

    /// Start advancing. From Finished this restarts at t = 0.
    pub fn play(&mut self) {
        match self.phase() {
            PlaybackPhase::Playing => return,
            PlaybackPhase::Finished => {
                log::debug!("Restarting playback from the end of the timeline");
                self.current_time = 0.0;
            }
            PlaybackPhase::StoppedAtStart | PlaybackPhase::Paused => {}
        }
        self.playing = true;
        self.last_timestamp = None;
    }

    /// Stop advancing; no-op unless playing
    pub fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.last_timestamp = None;
        }
    }

    /// Play/pause button: pause while playing, otherwise play (restarting if finished)
    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Scrub to `t`, clamped into the timeline. Scrubbing always pauses.
    pub fn seek(&mut self, t: f64) {
        self.current_time = if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, self.max_duration)
        };
        self.playing = false;
        self.last_timestamp = None;
    }

    /// Back to t = 0, not playing
    pub fn reset(&mut self) {
        self.current_time = 0.0;
        self.playing = false;
        self.last_timestamp = None;
    }

    /// Replace the timeline length, keeping the current time inside it
    pub fn set_max_duration(&mut self, max_duration: f64) {
        self.max_duration = max_duration.max(0.0);
        self.current_time = self.current_time.min(self.max_duration);
    }

    /// Per-frame entry point with the host's timestamp in milliseconds.
    ///
    /// The first tick after entering Playing only records the baseline.
    /// Timestamps that go backwards count as zero elapsed time.
    pub fn tick(&mut self, now_ms: f64) -> Option<PlaybackEvent> {
        if !self.playing {
            self.last_timestamp = None;
            return None;
        }

        let last = self.last_timestamp.replace(now_ms)?;
        let dt = ((now_ms - last) / 1000.0).max(0.0);
        self.advance(dt)
    }

    /// Advance by `dt` seconds while playing. Returns `Finished` on the
    /// advance that reaches the end; time is then parked exactly at the end.
    pub fn advance(&mut self, dt: f64) -> Option<PlaybackEvent> {
        if !self.playing || dt.is_nan() || dt <= 0.0 {
            return None;
        }

        let next = self.current_time + dt;
        if next >= self.max_duration {
            self.current_time = self.max_duration;
            self.playing = false;
            self.last_timestamp = None;
            log::info!("Playback finished at t = {:.3}s", self.max_duration);
            Some(PlaybackEvent::Finished)
        } else {
            self.current_time = next;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn playing_driver(max: f64) -> PlaybackDriver {
        let mut driver = PlaybackDriver::new(max);
        driver.play();
        driver
    }

    #[test]
    fn test_starts_stopped_at_start() {
        let driver = PlaybackDriver::new(8.5);
        assert_eq!(driver.phase(), PlaybackPhase::StoppedAtStart);
        assert_eq!(driver.current_time(), 0.0);
        assert!(!driver.is_playing());
    }

    #[test]
    fn test_first_tick_is_baseline() {
        let mut driver = playing_driver(10.0);

        // A large host timestamp must not count as elapsed time
        assert_eq!(driver.tick(123_456.0), None);
        assert_eq!(driver.current_time(), 0.0);

        driver.tick(123_956.0);
        assert!((driver.current_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_resume_does_not_jump() {
        let mut driver = playing_driver(10.0);
        driver.tick(0.0);
        driver.tick(1000.0);
        assert!((driver.current_time() - 1.0).abs() < 1e-12);

        driver.pause();
        // Frames keep coming while paused
        driver.tick(2000.0);
        driver.tick(5000.0);
        assert!((driver.current_time() - 1.0).abs() < 1e-12);

        driver.play();
        driver.tick(9000.0);
        assert!((driver.current_time() - 1.0).abs() < 1e-12);
        driver.tick(9250.0);
        assert!((driver.current_time() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_irregular_frame_intervals() {
        let mut driver = playing_driver(10.0);
        let stamps = [0.0, 16.0, 50.0, 51.0, 133.0, 1000.0];
        for stamp in stamps {
            driver.tick(stamp);
        }
        assert!((driver.current_time() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_backwards_timestamp_is_zero_delta() {
        let mut driver = playing_driver(10.0);
        driver.tick(1000.0);
        driver.tick(900.0);
        assert_eq!(driver.current_time(), 0.0);
        driver.tick(1400.0);
        assert!((driver.current_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_finishes_exactly_at_end_once() {
        let mut driver = playing_driver(2.0);
        assert_eq!(driver.advance(1.5), None);
        assert_eq!(driver.advance(1.5), Some(PlaybackEvent::Finished));
        assert_eq!(driver.current_time(), 2.0);
        assert_eq!(driver.phase(), PlaybackPhase::Finished);

        // No repeat notifications
        assert_eq!(driver.advance(1.0), None);
        assert_eq!(driver.tick(10_000.0), None);
        assert_eq!(driver.current_time(), 2.0);
    }

    #[test]
    fn test_play_from_finished_restarts() {
        let mut driver = playing_driver(2.0);
        driver.advance(5.0);
        assert!(driver.is_finished());

        driver.play();
        assert_eq!(driver.phase(), PlaybackPhase::Playing);
        assert_eq!(driver.current_time(), 0.0);
    }

    #[test]
    fn test_toggle_cycle() {
        let mut driver = PlaybackDriver::new(2.0);
        driver.toggle();
        assert_eq!(driver.phase(), PlaybackPhase::Playing);

        driver.advance(0.5);
        driver.toggle();
        assert_eq!(driver.phase(), PlaybackPhase::Paused);
        assert_eq!(driver.current_time(), 0.5);

        driver.toggle();
        assert_eq!(driver.phase(), PlaybackPhase::Playing);
        assert_eq!(driver.current_time(), 0.5);

        driver.advance(10.0);
        assert_eq!(driver.phase(), PlaybackPhase::Finished);
        driver.toggle();
        assert_eq!(driver.phase(), PlaybackPhase::Playing);
        assert_eq!(driver.current_time(), 0.0);
    }

    #[test]
    fn test_pause_idempotent() {
        let mut once = playing_driver(5.0);
        once.advance(1.0);
        let mut twice = once.clone();

        once.pause();
        twice.pause();
        twice.pause();

        assert_eq!(once.phase(), twice.phase());
        assert_eq!(once.current_time(), twice.current_time());
        assert_eq!(once.is_playing(), twice.is_playing());
    }

    #[test]
    fn test_pause_is_noop_when_not_playing() {
        let mut driver = PlaybackDriver::new(5.0);
        driver.pause();
        assert_eq!(driver.phase(), PlaybackPhase::StoppedAtStart);
    }

    #[test]
    fn test_seek_pauses_and_sets_phase() {
        let mut driver = playing_driver(4.0);
        driver.seek(1.0);
        assert!(!driver.is_playing());
        assert_eq!(driver.phase(), PlaybackPhase::Paused);

        driver.seek(0.0);
        assert_eq!(driver.phase(), PlaybackPhase::StoppedAtStart);

        driver.seek(4.0);
        assert_eq!(driver.phase(), PlaybackPhase::Finished);

        driver.seek(-3.0);
        assert_eq!(driver.current_time(), 0.0);

        driver.seek(99.0);
        assert_eq!(driver.current_time(), 4.0);

        driver.seek(f64::NAN);
        assert_eq!(driver.current_time(), 0.0);
    }

    #[test]
    fn test_seek_then_play_does_not_jump() {
        let mut driver = playing_driver(4.0);
        driver.tick(0.0);
        driver.tick(500.0);
        driver.seek(2.0);
        driver.play();
        driver.tick(60_000.0);
        assert_eq!(driver.current_time(), 2.0);
    }

    #[test]
    fn test_reset_from_anywhere() {
        let mut driver = playing_driver(4.0);
        driver.advance(2.0);
        driver.reset();
        assert_eq!(driver.phase(), PlaybackPhase::StoppedAtStart);

        driver.play();
        driver.advance(9.0);
        driver.reset();
        assert_eq!(driver.phase(), PlaybackPhase::StoppedAtStart);
    }

    #[test]
    fn test_set_max_duration_clamps_current_time() {
        let mut driver = PlaybackDriver::new(10.0);
        driver.seek(7.0);
        driver.set_max_duration(5.0);
        assert_eq!(driver.current_time(), 5.0);
        assert_eq!(driver.phase(), PlaybackPhase::Finished);
    }

    proptest! {
        #[test]
        fn prop_seek_clamps(max in 0.1..100.0f64, t in proptest::num::f64::ANY) {
            let mut driver = PlaybackDriver::new(max);
            driver.seek(t);
            prop_assert!(driver.current_time() >= 0.0);
            prop_assert!(driver.current_time() <= max);
            prop_assert!(!driver.is_playing());
        }

        #[test]
        fn prop_time_stays_in_range(
            max in 0.5..20.0f64,
            deltas in proptest::collection::vec(0.0..200.0f64, 1..200),
        ) {
            let mut driver = playing_driver(max);
            let mut now = 0.0;
            let mut finished = 0;
            for delta in deltas {
                now += delta;
                if driver.tick(now).is_some() {
                    finished += 1;
                }
                prop_assert!(driver.current_time() >= 0.0);
                prop_assert!(driver.current_time() <= max);
            }
            prop_assert!(finished <= 1);
        }
    }
}
