//! Frame-timer animation state
//!
//! Animations advance on the simulation clock: a frame steps once its frame
//! time has elapsed since the previous step. Callers decide whether reaching
//! the end loops or finishes the animation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Animation {
    /// Current frame index
    pub frame: usize,
    /// Simulation time of the last frame step
    pub stepped_at: u64,
}

impl Animation {
    pub fn new(now: u64) -> Self {
        Self {
            frame: 0,
            stepped_at: now,
        }
    }

    /// Back to frame 0, timer restarted
    pub fn restart(&mut self, now: u64) {
        self.frame = 0;
        self.stepped_at = now;
    }

    /// Step one frame if `frame_ms` has elapsed. Returns true on a step.
    pub fn step(&mut self, now: u64, frame_ms: u64) -> bool {
        if now.saturating_sub(self.stepped_at) < frame_ms {
            return false;
        }
        self.frame += 1;
        self.stepped_at = now;
        true
    }

    /// Looping step; the frame wraps to 0 after the last one
    pub fn step_looping(&mut self, now: u64, frame_ms: u64, frames: usize) -> bool {
        let stepped = self.step(now, frame_ms);
        if stepped {
            self.frame %= frames.max(1);
        }
        stepped
    }

    /// One-shot step. Returns true once the animation has run past its last frame.
    pub fn step_once(&mut self, now: u64, frame_ms: u64, frames: usize) -> bool {
        self.step(now, frame_ms) && self.frame >= frames
    }
}

/// True once `duration` has elapsed since `since`
#[inline]
pub fn elapsed(now: u64, since: u64, duration: u64) -> bool {
    now.saturating_sub(since) >= duration
}
