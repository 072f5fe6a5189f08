//! Sprite animation playback state.
//!
//! The component only tracks time and the current frame; frame data lives in an
//! [`AnimationLibrary`](crate::assets::animation::AnimationLibrary) and the
//! [`SpriteAnimationSystem`](crate::systems::animation::SpriteAnimationSystem)
//! copies the current frame into the entity's mesh.

use std::fmt;

use crate::api::types::EntityId;
use crate::assets::animation::{AnimationDef, AnimationId};

/// Called with the entity id when a non-looping animation reaches its end.
pub type FinishFn = Box<dyn FnMut(EntityId)>;

/// Result of advancing an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Step {
    /// The current frame index changed.
    pub frame_changed: bool,
    /// A non-looping animation just reached its end.
    pub finished: bool,
}

pub struct SpriteAnimation {
    pub animation: AnimationId,
    /// Index of the frame on screen.
    pub current_index: usize,
    /// Seconds spent on the current frame. Overflow carries into the next frame.
    pub hold: f32,
    /// Playback speed; negative plays backwards.
    pub rate: f32,
    pub looping: bool,
    pub playing: bool,
    finished: bool,
    // Set on construction so a freshly attached animation always reaches the mesh.
    unshown: bool,
    on_finish: Option<FinishFn>,
}

impl fmt::Debug for SpriteAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteAnimation")
            .field("animation", &self.animation)
            .field("current_index", &self.current_index)
            .field("hold", &self.hold)
            .field("rate", &self.rate)
            .field("looping", &self.looping)
            .field("playing", &self.playing)
            .field("finished", &self.finished)
            .field("on_finish", &self.on_finish.is_some())
            .finish()
    }
}

impl SpriteAnimation {
    pub fn new(animation: AnimationId) -> Self {
        Self {
            animation,
            current_index: 0,
            hold: 0.0,
            rate: 1.0,
            looping: true,
            playing: true,
            finished: false,
            unshown: true,
            on_finish: None,
        }
    }

    // -- Builder pattern --

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_start_index(mut self, index: usize) -> Self {
        self.current_index = index;
        self
    }

    pub fn with_on_finish(mut self, f: impl FnMut(EntityId) + 'static) -> Self {
        self.on_finish = Some(Box::new(f));
        self
    }

    /// Switch to `animation` from its first frame.
    pub fn play(&mut self, animation: AnimationId) {
        self.animation = animation;
        self.current_index = 0;
        self.hold = 0.0;
        self.playing = true;
        self.finished = false;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn resume(&mut self) {
        self.playing = true;
    }

    /// True once a non-looping animation has reached its end and has not moved since.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// True the first time it is called on a new animation.
    pub(crate) fn take_unshown(&mut self) -> bool {
        std::mem::replace(&mut self.unshown, false)
    }

    pub(crate) fn notify_finished(&mut self, entity: EntityId) {
        if let Some(f) = self.on_finish.as_mut() {
            f(entity);
        }
    }

    /// Advance by `dt` seconds against `def`.
    ///
    /// A frame is left once `hold` reaches its duration; the excess carries
    /// into the next frame, so long steps can skip several frames.
    pub fn step(&mut self, def: &AnimationDef, dt: f32) -> Step {
        let mut step = Step::default();
        if !self.playing || def.frames.is_empty() || def.total_duration() <= 0.0 {
            return step;
        }

        let last = def.frames.len() - 1;
        if self.current_index > last {
            self.current_index = last;
            step.frame_changed = true;
        }
        let start = self.current_index;
        let duration = |i: usize| def.frames[i].duration;

        let hold = self.hold + dt * self.rate;
        if !hold.is_finite() {
            log::warn!("ignoring non-finite animation step (dt {dt}, rate {})", self.rate);
            return step;
        }
        self.hold = hold;

        // Resolve steps that leave the cycle up front so the carry loops below
        // walk each frame at most once.
        let total = def.total_duration();
        let before: f32 = def.frames[..self.current_index].iter().map(|f| f.duration).sum();
        if self.looping {
            if self.hold >= total || self.hold < -total {
                self.hold = (before + self.hold).rem_euclid(total);
                self.current_index = 0;
            }
        } else if self.hold >= total - before {
            self.current_index = last;
            self.hold = duration(last);
            self.mark_finished(&mut step);
        } else if self.hold < -before {
            self.current_index = 0;
            self.hold = 0.0;
            self.mark_finished(&mut step);
        }

        while self.hold >= duration(self.current_index) {
            if self.current_index < last {
                self.hold -= duration(self.current_index);
                self.current_index += 1;
                self.finished = false;
            } else if self.looping {
                self.hold -= duration(self.current_index);
                self.current_index = 0;
            } else {
                self.hold = duration(last);
                self.mark_finished(&mut step);
                break;
            }
        }

        while self.hold < 0.0 {
            if self.current_index > 0 {
                self.current_index -= 1;
                self.hold += duration(self.current_index);
                self.finished = false;
            } else if self.looping {
                self.current_index = last;
                self.hold += duration(last);
            } else {
                self.hold = 0.0;
                self.mark_finished(&mut step);
                break;
            }
        }

        step.frame_changed |= self.current_index != start;
        step
    }

    fn mark_finished(&mut self, step: &mut Step) {
        if !self.finished {
            self.finished = true;
            step.finished = true;
        }
    }
}
