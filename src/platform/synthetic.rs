//! Deterministic frame source for headless runs and tests

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::LoopControl;

/// Produces frame timestamps at a nominal interval, with optional seeded jitter
#[derive(Debug, Clone)]
pub struct SyntheticFrames {
    start_ms: f64,
    interval_ms: f64,
    jitter: Option<(u64, f64)>,
    limit: Option<u64>,
}

impl SyntheticFrames {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            start_ms: 0.0,
            interval_ms: interval_ms.max(0.0),
            jitter: None,
            limit: None,
        }
    }

    /// Timestamp of the first frame
    pub fn starting_at(mut self, start_ms: f64) -> Self {
        self.start_ms = start_ms;
        self
    }

    /// Vary each interval uniformly by up to `±jitter_ms` (never below zero)
    pub fn with_jitter(mut self, seed: u64, jitter_ms: f64) -> Self {
        self.jitter = (jitter_ms > 0.0).then_some((seed, jitter_ms));
        self
    }

    /// Stop after `frames` frames even if the callback wants more
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    /// Drive `on_frame` until it returns `Stop` or the limit is hit.
    /// Returns the number of frames delivered.
    pub fn run(&self, mut on_frame: impl FnMut(f64) -> LoopControl) -> u64 {
        let mut rng = self.jitter.map(|(seed, _)| Pcg32::seed_from_u64(seed));
        let mut now = self.start_ms;
        let mut frames = 0;

        loop {
            if self.limit.is_some_and(|limit| frames >= limit) {
                log::debug!("Synthetic frame limit reached after {} frames", frames);
                break;
            }
            frames += 1;
            if on_frame(now) == LoopControl::Stop {
                break;
            }

            let mut step = self.interval_ms;
            if let (Some(rng), Some((_, jitter))) = (rng.as_mut(), self.jitter) {
                step += rng.random_range(-jitter..=jitter);
            }
            now += step.max(0.0);
        }
        frames
    }
}
