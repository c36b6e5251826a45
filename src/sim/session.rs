//! Top-level simulation controller
//!
//! Owns the configuration, the solution derived from it, and the playback
//! clock. The three only change together: a new configuration is solved and
//! the clock reset in the same call, so a reader can never pair a fresh
//! clock with stale receptions.

use serde::{Deserialize, Serialize};

use super::config::{ConfigPatch, Configuration};
use super::playback::{PlaybackDriver, PlaybackEvent, PlaybackPhase};
use super::projection::{Projection, project};
use super::solver::{PulseId, Solution, solve};
use crate::report::Summary;

/// Something that happened between two frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A whistle reached train B
    PulseReceived(PulseId),
    /// The trains met
    Collision,
    /// The timeline ran out
    Finished,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    config: Configuration,
    solution: Solution,
    driver: PlaybackDriver,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

impl Simulation {
    /// Solve `config` and park the clock at t = 0
    pub fn new(config: Configuration) -> Self {
        let solution = solve(&config);
        Self {
            config,
            solution,
            driver: PlaybackDriver::new(solution.max_duration),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn driver(&self) -> &PlaybackDriver {
        &self.driver
    }

    pub fn current_time(&self) -> f64 {
        self.driver.current_time()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.driver.phase()
    }

    /// Apply a partial update (see [`Simulation::set_config`])
    pub fn update_config(&mut self, patch: &ConfigPatch) {
        let next = self.config.apply(patch);
        self.set_config(next);
    }

    /// Replace the configuration. Always resets the clock to a stopped t = 0;
    /// the solution is recomputed only when the value actually changed.
    pub fn set_config(&mut self, config: Configuration) {
        if config != self.config {
            self.config = config;
            self.solution = solve(&self.config);
            log::info!(
                "Configuration changed: {:?} -> receptions at {:.4}s / {:.4}s, timeline {:.3}s",
                self.config,
                self.solution.first().time,
                self.solution.last().time,
                self.solution.max_duration
            );
        }
        self.driver.set_max_duration(self.solution.max_duration);
        self.driver.reset();
    }

    pub fn play(&mut self) {
        self.driver.play();
    }

    pub fn pause(&mut self) {
        self.driver.pause();
    }

    pub fn toggle(&mut self) {
        self.driver.toggle();
    }

    pub fn seek(&mut self, t: f64) {
        self.driver.seek(t);
    }

    pub fn reset(&mut self) {
        self.driver.reset();
    }

    /// Frame callback with the host timestamp (ms)
    pub fn tick(&mut self, now_ms: f64) -> Vec<SimEvent> {
        let before = self.driver.current_time();
        let outcome = self.driver.tick(now_ms);
        self.crossed(before, outcome)
    }

    /// Advance by a raw delta (s), bypassing timestamps
    pub fn advance(&mut self, dt: f64) -> Vec<SimEvent> {
        let before = self.driver.current_time();
        let outcome = self.driver.advance(dt);
        self.crossed(before, outcome)
    }

    /// Events whose time lies in (before, now], in time order
    fn crossed(&self, before: f64, outcome: Option<PlaybackEvent>) -> Vec<SimEvent> {
        let now = self.driver.current_time();
        let mut events = Vec::new();
        if now <= before {
            return events;
        }

        let in_window = |t: f64| before < t && t <= now;
        let mut timed: Vec<(f64, SimEvent)> = self
            .solution
            .impacts
            .iter()
            .filter(|imp| in_window(imp.time))
            .map(|imp| (imp.time, SimEvent::PulseReceived(imp.pulse)))
            .collect();
        if in_window(self.solution.collision_time) {
            timed.push((self.solution.collision_time, SimEvent::Collision));
        }
        // Stable: receptions tied with the collision stay ahead of it
        timed.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (t, event) in timed {
            log::debug!("{:?} at t = {:.4}s", event, t);
            events.push(event);
        }
        if let Some(PlaybackEvent::Finished) = outcome {
            events.push(SimEvent::Finished);
        }
        events
    }

    /// Positions at the current time
    pub fn projection(&self) -> Projection {
        project(&self.config, &self.solution, self.driver.current_time())
    }

    /// Results panel contents at the current time
    pub fn summary(&self) -> Summary {
        Summary::at(&self.config, &self.solution, self.driver.current_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approx_eq;

    #[test]
    fn test_new_is_stopped_and_solved() {
        let sim = Simulation::default();
        assert_eq!(sim.phase(), PlaybackPhase::StoppedAtStart);
        assert_eq!(sim.solution(), &solve(&Configuration::default()));
        assert_eq!(sim.driver().max_duration(), sim.solution().max_duration);
    }

    #[test]
    fn test_config_change_resets_and_resolves() {
        let mut sim = Simulation::default();
        sim.play();
        sim.advance(3.0);
        assert_eq!(sim.phase(), PlaybackPhase::Playing);

        sim.update_config(&ConfigPatch {
            speed_a: Some(50.0),
            speed_b: Some(30.0),
            initial_distance: Some(500.0),
            ..Default::default()
        });

        assert_eq!(sim.phase(), PlaybackPhase::StoppedAtStart);
        assert_eq!(sim.current_time(), 0.0);
        assert!(approx_eq(sim.solution().first().time, 500.0 / 370.0, 1e-12));
        assert_eq!(sim.driver().max_duration(), sim.solution().max_duration);
        assert_eq!(sim.solution(), &solve(sim.config()));
    }

    #[test]
    fn test_unchanged_config_still_resets() {
        let mut sim = Simulation::default();
        sim.seek(4.0);
        sim.update_config(&ConfigPatch::default());
        assert_eq!(sim.phase(), PlaybackPhase::StoppedAtStart);
    }

    #[test]
    fn test_paused_clock_reset_on_change() {
        let mut sim = Simulation::default();
        sim.seek(6.0);
        assert_eq!(sim.phase(), PlaybackPhase::Paused);
        sim.set_config(Configuration::new(10.0, 10.0, 200.0, 0.5));
        assert_eq!(sim.current_time(), 0.0);
        assert_eq!(sim.driver().max_duration(), sim.solution().max_duration);
    }

    #[test]
    fn test_events_in_order_over_full_run() {
        let mut sim = Simulation::default();
        sim.play();

        let mut events = Vec::new();
        let mut now = 0.0;
        while sim.phase() == PlaybackPhase::Playing {
            events.extend(sim.tick(now));
            now += 16.0;
        }

        assert_eq!(
            events,
            vec![
                SimEvent::PulseReceived(PulseId::First),
                SimEvent::PulseReceived(PulseId::Second),
                SimEvent::Collision,
                SimEvent::Finished,
            ]
        );
        assert_eq!(sim.current_time(), sim.solution().max_duration);
    }

    #[test]
    fn test_single_large_step_reports_everything() {
        let mut sim = Simulation::default();
        sim.play();
        let events = sim.advance(100.0);
        assert_eq!(events.len(), 4);
        assert_eq!(events[3], SimEvent::Finished);
    }

    #[test]
    fn test_no_events_when_paused_or_scrubbing() {
        let mut sim = Simulation::default();
        sim.seek(5.0);
        assert!(sim.tick(0.0).is_empty());
        assert!(sim.advance(1.0).is_empty());
    }

    #[test]
    fn test_events_resume_after_seek() {
        let mut sim = Simulation::default();
        sim.seek(2.5);
        sim.play();
        let events = sim.advance(0.5);
        assert_eq!(events, vec![SimEvent::PulseReceived(PulseId::Second)]);
    }

    #[test]
    fn test_stationary_trains_never_report_collision() {
        let mut sim = Simulation::new(Configuration::new(0.0, 0.0, 500.0, 1.0));
        sim.play();
        let events = sim.advance(1e3);
        assert!(!events.contains(&SimEvent::Collision));
        assert_eq!(events.last(), Some(&SimEvent::Finished));
    }

    #[test]
    fn test_projection_tracks_clock() {
        let mut sim = Simulation::default();
        sim.seek(1.0);
        let p = sim.projection();
        assert_eq!(p.time, 1.0);
        assert_eq!(p.train_a, 40.0);
        assert_eq!(p.train_b, 740.0);
    }
}
