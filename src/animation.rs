//! Timed animations and the per-frame transaction that commits them.
//!
//! Property changes made while a frame is in flight are staged on a
//! [`Transaction`] and only applied when the renderer commits it at the end of
//! the frame, so every draw within one frame observes the same values.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Acceleration curve of an animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimingFunction {
    /// Constant speed throughout.
    #[default]
    Linear,
    /// Start slow, accelerate.
    EaseIn,
    /// Start fast, decelerate.
    EaseOut,
    /// Start slow, speed up, then slow down.
    EaseInEaseOut,
}

impl TimingFunction {
    /// Map linear progress in `[0, 1]` onto the curve.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            TimingFunction::Linear => t,
            TimingFunction::EaseIn => t * t,
            TimingFunction::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            TimingFunction::EaseInEaseOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// A fixed-length animation anchored at a start time (seconds).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    start: f64,
    duration: f64,
    timing: TimingFunction,
}

impl Animation {
    pub fn new(start: f64, duration: f64, timing: TimingFunction) -> Self {
        Self {
            start,
            duration: duration.max(0.0),
            timing,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn timing(&self) -> TimingFunction {
        self.timing
    }

    /// Linear progress at `now`, clamped to `[0, 1]`. Zero-length animations
    /// are complete immediately.
    pub fn linear_progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0) as f32
    }

    /// Eased progress at `now`.
    pub fn progress(&self, now: f64) -> f32 {
        self.timing.apply(self.linear_progress(now))
    }

    pub fn is_finished(&self, now: f64) -> bool {
        now >= self.start + self.duration
    }
}

/// Shared, animatable `f32` property.
///
/// Clones refer to the same value; writes through a [`Transaction`] land for
/// every holder at commit time.
#[derive(Clone, Debug)]
pub struct AnimatedValue(Rc<Cell<f32>>);

impl AnimatedValue {
    pub fn new(value: f32) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    /// Write immediately, bypassing any open transaction.
    pub fn set(&self, value: f32) {
        self.0.set(value);
    }
}

type StagedChange = Box<dyn FnOnce()>;

/// Batch of property changes committed together at the end of a frame.
///
/// Outside of a batch, staged changes are applied immediately.
#[derive(Default)]
pub struct Transaction {
    open: bool,
    staged: Vec<StagedChange>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the implicit per-frame batch. Re-opening an open batch is a no-op.
    pub fn begin_implicit(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    /// Queue `change` for the next commit, or run it now if no batch is open.
    pub fn stage(&mut self, change: impl FnOnce() + 'static) {
        if self.open {
            self.staged.push(Box::new(change));
        } else {
            change();
        }
    }

    /// Stage a write of `value` into `target`.
    pub fn set_value(&mut self, target: &AnimatedValue, value: f32) {
        let target = target.clone();
        self.stage(move || target.set(value));
    }

    /// Apply every staged change in staging order and close the batch.
    ///
    /// Returns how many changes were applied.
    pub fn commit_all(&mut self) -> usize {
        self.open = false;
        let staged = std::mem::take(&mut self.staged);
        let count = staged.len();
        for change in staged {
            change();
        }
        count
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("open", &self.open)
            .field("pending", &self.staged.len())
            .finish()
    }
}
