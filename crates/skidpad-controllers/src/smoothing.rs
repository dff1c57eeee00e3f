//! Signal damping for jittery analog axes.
//!
//! Two dampers with the same filter, one per axis representation: a device
//! wires the variant matching the domain its axis lives in and never both.
//! [`Smoothing`] works in the normalized `[-1, 1]` domain and is what the
//! built-in devices use (the classic pad's twist axis). [`RawSmoothing`]
//! works in native signed 16-bit counts and is offered for consumers that
//! damp before normalizing, e.g. to apply a jitter cutoff calibrated in
//! hardware counts.

use std::time::Duration;

/// Once the damped value lands this close to the target it snaps and the
/// pending target is cleared.
const SETTLE_EPSILON: f64 = 1e-4;

/// Raw samples closer than this to the last accepted target are dropped as
/// sensor jitter (~0.3% of the 16-bit range).
const JITTER_CUTOFF: u16 = 200;

/// Time-damped smoothing for a radial axis in [-1, 1], wrapping at the
/// boundary (e.g. a twist axis at the +/-180 degree mark).
///
/// Each update moves a proportion of the way from the current value to the
/// pending target. `rc` is the damping time constant; the blend factor is
/// `dt / (dt + rc)`, which keeps convergence independent of the frame rate.
pub struct Smoothing {
    current: f64,
    target: Option<f64>,
    rc: f64,
}

impl Smoothing {
    pub fn new(rc: f64) -> Self {
        Self::with_initial(rc, 0.0)
    }

    pub fn with_initial(rc: f64, initial: f64) -> Self {
        Self { current: initial, target: None, rc }
    }

    /// Records a pending raw sample. Overwrites any previous pending target.
    pub fn set_target(&mut self, value: f64) {
        self.target = Some(value);
    }

    /// Last computed smoothed value. Pure read.
    pub fn value(&self) -> f64 {
        self.current
    }

    /// Advances the damper by `dt` and returns the delta applied this tick.
    /// Returns 0.0 when there is no pending target.
    pub fn advance(&mut self, dt: Duration) -> f64 {
        let Some(target) = self.target else {
            return 0.0;
        };
        let dt = dt.as_secs_f64();
        let alpha = dt / (dt + self.rc);

        // Travel whichever way is shorter, including through the
        // discontinuity at +1/-1.
        let d = shortest_path(self.current, target);
        let mut change = alpha * d;
        if (d - change).abs() < SETTLE_EPSILON {
            change = d;
            self.target = None;
        }
        self.current = wrap(self.current + change);
        change
    }
}

/// Signed shortest travel from `from` to `to` on the wrapping [-1, 1] range.
fn shortest_path(from: f64, to: f64) -> f64 {
    let direct = to - from;
    if direct == 0.0 {
        return 0.0;
    }
    let around = direct - 2.0_f64.copysign(direct);
    if direct.abs() < around.abs() {
        direct
    } else {
        around
    }
}

fn wrap(value: f64) -> f64 {
    if value.abs() > 1.0 {
        value - 2.0_f64.copysign(value)
    } else {
        value
    }
}

/// Discretized damper over a device's native signed 16-bit range.
///
/// Arithmetic happens in the unsigned modular representation, so samples
/// that cross the integer wraparound point damp correctly without any
/// branching. Near-duplicate samples within [`JITTER_CUTOFF`] counts of the
/// last accepted target are discarded outright, not merged.
pub struct RawSmoothing {
    current: i16,
    target: Option<i16>,
    accepted: i16,
    rc: f64,
}

impl RawSmoothing {
    pub fn new(rc: f64) -> Self {
        Self::with_initial(rc, 0)
    }

    pub fn with_initial(rc: f64, initial: i16) -> Self {
        Self { current: initial, target: None, accepted: initial, rc }
    }

    /// Records a pending raw sample unless it is within the jitter cutoff
    /// of the last accepted one.
    pub fn set_target(&mut self, value: i16) {
        if modular_distance(self.accepted, value) < JITTER_CUTOFF {
            return;
        }
        self.accepted = value;
        self.target = Some(value);
    }

    pub fn value(&self) -> i16 {
        self.current
    }

    /// Advances the damper by `dt` and returns the delta applied this tick
    /// in native counts. Returns 0 when there is no pending target.
    pub fn advance(&mut self, dt: Duration) -> i16 {
        let Some(target) = self.target else {
            return 0;
        };
        let dt = dt.as_secs_f64();
        let alpha = dt / (dt + self.rc);

        // Wrapping subtraction picks the short way around the modular
        // range for free.
        let diff = (target as u16).wrapping_sub(self.current as u16) as i16;
        let mut step = (f64::from(diff) * alpha).round() as i16;
        if step == 0 {
            step = diff.signum();
        }
        self.current = (self.current as u16).wrapping_add(step as u16) as i16;
        if self.current == target {
            self.target = None;
        }
        step
    }
}

/// Distance between two native samples in the modular u16 domain.
fn modular_distance(a: i16, b: i16) -> u16 {
    let d = (b as u16).wrapping_sub(a as u16);
    d.min(d.wrapping_neg())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: Duration = Duration::from_millis(16);

    #[test]
    fn advance_without_target_is_inert() {
        let mut damper = Smoothing::new(0.1);
        assert_eq!(damper.advance(DT), 0.0);
        assert_eq!(damper.advance(Duration::from_secs(5)), 0.0);
        assert_eq!(damper.value(), 0.0);
    }

    #[test]
    fn converges_independent_of_step_split() {
        let target = 0.7;

        let mut fine = Smoothing::new(0.1);
        fine.set_target(target);
        for _ in 0..600 {
            fine.advance(DT);
        }

        let mut coarse = Smoothing::new(0.1);
        coarse.set_target(target);
        for _ in 0..60 {
            coarse.advance(Duration::from_millis(160));
        }

        assert!((fine.value() - target).abs() < 1e-3);
        assert!((coarse.value() - target).abs() < 1e-3);
    }

    #[test]
    fn settles_then_reports_zero_delta() {
        let mut damper = Smoothing::new(0.05);
        damper.set_target(0.3);
        for _ in 0..1000 {
            damper.advance(DT);
        }
        assert_eq!(damper.value(), 0.3);
        assert_eq!(damper.advance(DT), 0.0);
        assert_eq!(damper.value(), 0.3);
    }

    #[test]
    fn deltas_accumulate_to_the_value() {
        let mut damper = Smoothing::new(0.1);
        damper.set_target(-0.4);
        let mut sum = 0.0;
        for _ in 0..600 {
            sum += damper.advance(DT);
        }
        assert!((sum - damper.value()).abs() < 1e-9);
    }

    #[test]
    fn wraps_through_the_boundary() {
        let mut damper = Smoothing::with_initial(0.1, -0.99);
        damper.set_target(0.99);
        // Short path is through -1/+1, so the first step moves negative.
        let first = damper.advance(DT);
        assert!(first < 0.0);
        for _ in 0..1000 {
            damper.advance(DT);
        }
        assert!((damper.value() - 0.99).abs() < 1e-3);
    }

    #[test]
    fn raw_drops_jittery_samples() {
        let mut damper = RawSmoothing::new(0.1);
        damper.set_target(150);
        assert_eq!(damper.advance(DT), 0);
        assert_eq!(damper.value(), 0);

        damper.set_target(1000);
        assert!(damper.advance(DT) > 0);
    }

    #[test]
    fn raw_jitter_reference_is_last_accepted_target() {
        let mut damper = RawSmoothing::new(0.1);
        damper.set_target(1000);
        // 1100 is close to the accepted 1000, dropped even though it is far
        // from the current (still damping) value.
        damper.set_target(1100);
        for _ in 0..1000 {
            damper.advance(DT);
        }
        assert_eq!(damper.value(), 1000);
    }

    #[test]
    fn raw_crosses_the_integer_wraparound() {
        let mut damper = RawSmoothing::with_initial(0.05, i16::MAX - 100);
        let target = i16::MIN + 100;
        damper.set_target(target);
        // Short path is across MAX -> MIN, which means a positive step.
        assert!(damper.advance(DT) > 0);
        for _ in 0..10_000 {
            damper.advance(DT);
        }
        assert_eq!(damper.value(), target);
    }
}
