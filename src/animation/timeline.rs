use std::fmt::Debug;

/// Elapsed/duration pair shared by every timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    elapsed: f64,
    duration: f64,
}

impl Progress {
    pub fn new(duration: f64) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Move forward by `dt` seconds, clamped to the duration. Negative or
    /// non-finite deltas are ignored. Returns true once complete.
    pub fn advance(&mut self, dt: f64) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration);
        }
        self.is_complete()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Fraction done, in `[0, 1]`
    pub fn fraction(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }
}

/// A presentation driven by explicit `advance(dt)` calls.
///
/// `pose()` depends only on values fixed when the timeline was built and on
/// the elapsed time, so the terminal pose can be checked without a renderer.
pub trait Timeline {
    type Pose: Clone + Debug;

    fn progress(&self) -> &Progress;

    fn progress_mut(&mut self) -> &mut Progress;

    fn pose(&self) -> Self::Pose;

    /// Returns true once the timeline has reached its end
    fn advance(&mut self, dt: f64) -> bool {
        self.progress_mut().advance(dt)
    }

    fn is_complete(&self) -> bool {
        self.progress().is_complete()
    }

    fn elapsed(&self) -> f64 {
        self.progress().elapsed()
    }

    fn duration(&self) -> f64 {
        self.progress().duration()
    }

    /// Rewind to the first frame. Fixed parameters are kept.
    fn restart(&mut self) {
        self.progress_mut().restart()
    }

    /// Jump to the terminal pose
    fn finish(&mut self) {
        self.progress_mut().finish()
    }
}
