//! Platform abstraction layer
//!
//! Frame scheduling is the only platform concern the simulation has. Every
//! frame source hands the callback a host timestamp in milliseconds and the
//! callback decides whether the loop keeps going:
//! - `SyntheticFrames`: deterministic native frames, optionally jittered
//! - `AnimationFrameLoop`: browser `requestAnimationFrame` (wasm32 only)

mod synthetic;
#[cfg(target_arch = "wasm32")]
mod web;

pub use synthetic::SyntheticFrames;
#[cfg(target_arch = "wasm32")]
pub use web::AnimationFrameLoop;

/// Returned by a frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}
