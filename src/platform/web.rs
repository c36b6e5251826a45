//! Browser frame loop
//!
//! Registers a repeating `requestAnimationFrame` callback. The registration
//! lives exactly as long as the returned handle: dropping it cancels the
//! pending frame and releases the closure.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::LoopControl;

type FrameClosure = Closure<dyn FnMut(f64)>;

pub struct AnimationFrameLoop {
    pending: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<FrameClosure>>>,
}

fn request_frame(callback: &FrameClosure) -> Option<i32> {
    let window = web_sys::window()?;
    match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        Ok(id) => Some(id),
        Err(e) => {
            log::error!("requestAnimationFrame failed: {:?}", e);
            None
        }
    }
}

impl AnimationFrameLoop {
    /// Start calling `on_frame` once per animation frame with the
    /// `DOMHighResTimeStamp` (ms) until it returns `Stop` or the handle drops
    pub fn start<F>(mut on_frame: F) -> Self
    where
        F: FnMut(f64) -> LoopControl + 'static,
    {
        let pending = Rc::new(Cell::new(None));
        let callback: Rc<RefCell<Option<FrameClosure>>> = Rc::new(RefCell::new(None));

        let frame_pending = pending.clone();
        let frame_callback = callback.clone();
        *callback.borrow_mut() = Some(Closure::new(move |now: f64| {
            frame_pending.set(None);
            if on_frame(now) == LoopControl::Stop {
                log::info!("Frame loop stopped");
                return;
            }
            if let Some(cb) = frame_callback.borrow().as_ref() {
                frame_pending.set(request_frame(cb));
            }
        }));

        if let Some(cb) = callback.borrow().as_ref() {
            pending.set(request_frame(cb));
        }

        Self { pending, callback }
    }
}

impl Drop for AnimationFrameLoop {
    fn drop(&mut self) {
        if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        // The closure holds an Rc to its own slot; clearing it breaks the cycle
        self.callback.borrow_mut().take();
    }
}
