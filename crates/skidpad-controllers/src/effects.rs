//! Stock haptic waveforms.

use std::f64::consts::TAU;
use std::time::Duration;

use crate::haptics::{DualRumble, HapticEffect, Motor, RumbleLevels, SingleRumble};

/// Sharp periodic tick for a single-motor device: a sine cycle raised to a
/// high power, so the motor fires in short bursts once per cycle.
pub struct TickEffect {
    magnitude: f64,
    frequency: f64,
}

impl TickEffect {
    pub fn new(magnitude: f64, frequency: f64) -> Self {
        Self { magnitude, frequency }
    }
}

impl Default for TickEffect {
    fn default() -> Self {
        Self::new(0.25, 1.0)
    }
}

impl HapticEffect<SingleRumble> for TickEffect {
    fn sample(&self, elapsed: Duration) -> f64 {
        let cycled = (elapsed.as_secs_f64() * self.frequency).fract();
        let intensity = ((cycled * TAU).sin() + 1.0) / 2.0;
        intensity.powi(100) * self.magnitude
    }
}

/// Two sine pulses with a phase offset between the high- and low-frequency
/// motors. A zero offset throbs both motors in unison; an offset of pi
/// alternates them.
pub struct DualPulseEffect {
    magnitude: f64,
    frequency: f64,
    phase_offset: f64,
}

impl DualPulseEffect {
    pub fn new(magnitude: f64, frequency: f64, phase_offset: f64) -> Self {
        Self { magnitude, frequency, phase_offset }
    }
}

impl Default for DualPulseEffect {
    fn default() -> Self {
        Self::new(0.25, 1.0, 0.0)
    }
}

impl HapticEffect<DualRumble> for DualPulseEffect {
    fn sample(&self, elapsed: Duration) -> RumbleLevels {
        let cycled = (elapsed.as_secs_f64() * self.frequency).fract();
        let high = ((cycled * TAU).sin() + 1.0) / 2.0;
        let low = ((cycled * TAU + self.phase_offset).sin() + 1.0) / 2.0;
        RumbleLevels { high: high * self.magnitude, low: low * self.magnitude }
    }
}

/// Fixed output, optionally time-bounded. Handy for rumble tests and as a
/// building block under other effects.
pub struct ConstantEffect<M: Motor> {
    params: M::Params,
    length: Option<Duration>,
}

impl<M: Motor> ConstantEffect<M> {
    pub fn new(params: M::Params, length: Option<Duration>) -> Self {
        Self { params, length }
    }
}

impl<M: Motor> HapticEffect<M> for ConstantEffect<M> {
    fn sample(&self, _elapsed: Duration) -> M::Params {
        self.params
    }

    fn duration(&self) -> Option<Duration> {
        self.length
    }
}
