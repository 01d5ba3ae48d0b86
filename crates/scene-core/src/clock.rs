//! Animation time and the bounded oscillators driven by it.

use instant::Instant;

/// Monotonic time source. Only differences between reads matter.
pub trait AnimationClock {
    fn elapsed_secs(&self) -> f64;
}

/// Wall-clock time since construction.
#[derive(Clone, Copy, Debug)]
pub struct InstantClock {
    started: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationClock for InstantClock {
    fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

/// `base + amplitude * sin(rate * t)`, always within `base ± amplitude`.
#[inline]
pub fn oscillate(t_secs: f64, base: f32, amplitude: f32, rate: f32) -> f32 {
    base + amplitude * (t_secs * rate as f64).sin() as f32
}
