use std::time::Duration;

use crate::easing::Easing;

/// Values a tween can interpolate.
pub trait Lerp: Copy {
    fn lerp(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    // Weighted form so t = 0 and t = 1 return the endpoints bit-for-bit.
    fn lerp(self, other: Self, t: f32) -> Self {
        self * (1.0 - t) + other * t
    }
}

impl Lerp for [f32; 2] {
    fn lerp(self, other: Self, t: f32) -> Self {
        [self[0].lerp(other[0], t), self[1].lerp(other[1], t)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Playing,
    Paused,
    Finished,
}

/// Outcome of advancing a tween by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenStep<T> {
    /// Paused or already finished; the value did not move.
    Held(T),
    Running(T),
    /// Reached the end on this step. Reported exactly once.
    Completed(T),
}

/// Interpolates `from → to` over `duration` along an easing curve.
///
/// Tweens are created paused and only move while playing, so pausing and
/// resuming keeps the elapsed time instead of restarting.
#[derive(Debug, Clone)]
pub struct Tween<T> {
    from: T,
    to: T,
    duration: Duration,
    easing: Easing,
    elapsed: Duration,
    playback: Playback,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
            elapsed: Duration::ZERO,
            playback: Playback::Paused,
        }
    }

    pub fn play(&mut self) {
        if self.playback == Playback::Paused {
            self.playback = Playback::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.playback == Playback::Playing {
            self.playback = Playback::Paused;
        }
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn is_finished(&self) -> bool {
        self.playback == Playback::Finished
    }

    pub fn target(&self) -> T {
        self.to
    }

    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn value(&self) -> T {
        if self.elapsed >= self.duration {
            return self.to;
        }
        self.from.lerp(self.to, self.easing.sample(self.progress()))
    }

    pub fn advance(&mut self, dt: Duration) -> TweenStep<T> {
        if self.playback != Playback::Playing {
            return TweenStep::Held(self.value());
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.playback = Playback::Finished;
            TweenStep::Completed(self.to)
        } else {
            TweenStep::Running(self.value())
        }
    }
}
