use std::rc::Rc;
use std::time::Duration;

use sdl2::haptic::Haptic;
use sdl2::HapticSubsystem;

use crate::types::DeviceId;

/// How long a single hardware rumble write stays valid. Active effects are
/// re-applied every tick, so this only needs to outlast one frame.
pub(crate) const RUMBLE_SLICE_MS: u32 = 1000;

/// Motor capability of a haptic device: the output parameter shape and its
/// resting ("clear") value.
pub trait Motor {
    type Params: Copy + PartialEq + std::fmt::Debug;

    fn clear() -> Self::Params;
}

/// A device with one rumble motor, driven by a scalar intensity.
pub enum SingleRumble {}

impl Motor for SingleRumble {
    type Params = f64;

    fn clear() -> f64 {
        0.0
    }
}

/// Output levels for a dual-motor device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RumbleLevels {
    pub high: f64,
    pub low: f64,
}

/// A device with high- and low-frequency rumble motors.
pub enum DualRumble {}

impl Motor for DualRumble {
    type Params = RumbleLevels;

    fn clear() -> RumbleLevels {
        RumbleLevels { high: 0.0, low: 0.0 }
    }
}

/// A feedback waveform: a pure function of elapsed time within its own
/// duration. `duration` of `None` means the effect never expires on its own
/// and must be removed explicitly.
pub trait HapticEffect<M: Motor> {
    fn sample(&self, elapsed: Duration) -> M::Params;

    fn duration(&self) -> Option<Duration> {
        None
    }
}

/// LIFO stack of active effects for one device. The newest effect plays;
/// when it expires, its overflowed time rolls into the effect beneath it.
///
/// The stack is the device-independent half of the haptic engine; the owning
/// device applies the returned params to its hardware.
pub struct EffectStack<M: Motor> {
    entries: Vec<(Rc<dyn HapticEffect<M>>, Duration)>,
}

impl<M: Motor> Default for EffectStack<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Motor> EffectStack<M> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Pushes an effect with zero accumulated time. It starts playing
    /// immediately on the next tick.
    pub fn play(&mut self, effect: Rc<dyn HapticEffect<M>>) {
        self.entries.push((effect, Duration::ZERO));
    }

    /// Removes an effect, scanning from the top of the stack. Its
    /// accumulated time folds into the next-older entry so that entry's
    /// phase does not jump. Returns true if the stack became empty, in
    /// which case the caller must reset the motor to the clear state.
    pub fn remove(&mut self, effect: &Rc<dyn HapticEffect<M>>) -> bool {
        let Some(pos) =
            self.entries.iter().rposition(|(e, _)| Rc::ptr_eq(e, effect))
        else {
            return false;
        };
        let (_, elapsed) = self.entries.remove(pos);
        if pos > 0 {
            self.entries[pos - 1].1 += elapsed;
        }
        self.entries.is_empty()
    }

    /// Accumulated elapsed time of an effect on the stack, scanning from
    /// the top.
    pub fn elapsed(&self, effect: &Rc<dyn HapticEffect<M>>) -> Option<Duration> {
        self.entries
            .iter()
            .rev()
            .find(|(e, _)| Rc::ptr_eq(e, effect))
            .map(|(_, elapsed)| *elapsed)
    }

    /// Advances the stack by `dt` and returns the params to apply this
    /// tick: the surviving topmost effect's sample, the clear value exactly
    /// once when the stack drains, or `None` while idle.
    ///
    /// Expired effects pop with their overflow carried into the entry
    /// beneath, so stacked effects never lose time.
    pub fn advance(&mut self, dt: Duration) -> Option<M::Params> {
        if self.entries.is_empty() {
            return None;
        }
        let mut carry = dt;
        loop {
            let Some((effect, elapsed)) = self.entries.last_mut() else {
                return Some(M::clear());
            };
            *elapsed += carry;
            let at = *elapsed;
            match effect.duration() {
                Some(total) if at >= total => {
                    carry = at - total;
                    self.entries.pop();
                }
                _ => return Some(effect.sample(at)),
            }
        }
    }
}

/// Driver for a single-motor device, pairing an [`EffectStack`] with the
/// SDL haptic handle it writes to. The handle is absent while the hardware
/// is detached; the stack keeps scheduling regardless.
pub(crate) struct SingleMotor {
    raw: Option<Haptic>,
    stack: EffectStack<SingleRumble>,
}

impl SingleMotor {
    /// Opens the haptic device for a joystick instance. Returns `None`
    /// when the hardware cannot play rumble, which leaves the owning
    /// device without a driver (all haptic calls become no-ops).
    pub(crate) fn open(subsystem: &HapticSubsystem, id: DeviceId) -> Option<Self> {
        match subsystem.open_from_joystick_id(id) {
            Ok(raw) => Some(Self { raw: Some(raw), stack: EffectStack::new() }),
            Err(err) => {
                log::debug!("no haptic driver for device {id}: {err}");
                None
            }
        }
    }

    /// Re-acquires the hardware handle after a reopen, keeping the
    /// scheduled effect stack intact.
    pub(crate) fn reattach(
        &mut self,
        subsystem: &HapticSubsystem,
        id: DeviceId,
        has_rumble: bool,
    ) {
        self.raw = if has_rumble {
            subsystem.open_from_joystick_id(id).ok()
        } else {
            None
        };
    }

    pub(crate) fn detach(&mut self) {
        self.raw = None;
    }

    pub(crate) fn play(&mut self, effect: Rc<dyn HapticEffect<SingleRumble>>) {
        self.stack.play(effect);
    }

    pub(crate) fn remove(&mut self, effect: &Rc<dyn HapticEffect<SingleRumble>>) {
        if self.stack.remove(effect) {
            self.apply(SingleRumble::clear());
        }
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        if let Some(level) = self.stack.advance(dt) {
            self.apply(level);
        }
    }

    fn apply(&mut self, level: f64) {
        let Some(raw) = self.raw.as_mut() else {
            return;
        };
        let strength = level.clamp(0.0, 1.0);
        if strength > 0.0 {
            raw.rumble_play(strength as f32, RUMBLE_SLICE_MS);
        } else {
            raw.rumble_stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ConstantEffect;

    fn constant(level: f64, length: Option<Duration>) -> Rc<dyn HapticEffect<SingleRumble>> {
        Rc::new(ConstantEffect::<SingleRumble>::new(level, length))
    }

    #[test]
    fn idle_stack_applies_nothing() {
        let mut stack: EffectStack<SingleRumble> = EffectStack::new();
        assert_eq!(stack.advance(Duration::from_millis(16)), None);
    }

    #[test]
    fn topmost_effect_plays() {
        let mut stack = EffectStack::new();
        let base = constant(0.2, None);
        let top = constant(0.8, None);
        stack.play(base);
        stack.play(top);
        assert_eq!(stack.advance(Duration::from_millis(16)), Some(0.8));
    }

    #[test]
    fn overflow_credits_the_effect_beneath() {
        let mut stack = EffectStack::new();
        let base = constant(0.2, None);
        let top = constant(0.8, Some(Duration::from_millis(100)));
        stack.play(base.clone());
        stack.play(top);

        // 250ms past a 100ms effect: it pops and the base inherits the
        // 150ms overflow, not the full 250ms and not zero.
        assert_eq!(stack.advance(Duration::from_millis(250)), Some(0.2));
        assert_eq!(stack.elapsed(&base), Some(Duration::from_millis(150)));
    }

    #[test]
    fn expiry_cascades_through_multiple_entries() {
        let mut stack = EffectStack::new();
        let a = constant(0.1, Some(Duration::from_millis(50)));
        let b = constant(0.2, Some(Duration::from_millis(50)));
        stack.play(a);
        stack.play(b);
        // 130ms consumes both and drains the stack: one clear.
        assert_eq!(stack.advance(Duration::from_millis(130)), Some(0.0));
        assert_eq!(stack.advance(Duration::from_millis(16)), None);
    }

    #[test]
    fn unbounded_effect_never_pops() {
        let mut stack = EffectStack::new();
        let fx = constant(0.5, None);
        stack.play(fx.clone());
        assert_eq!(stack.advance(Duration::from_secs(3600)), Some(0.5));
        assert_eq!(stack.elapsed(&fx), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn removing_mid_stack_folds_time_into_the_older_entry() {
        let mut stack = EffectStack::new();
        let base = constant(0.2, None);
        let mid = constant(0.5, None);
        let top = constant(0.8, None);
        stack.play(base.clone());
        stack.advance(Duration::from_millis(50));
        stack.play(mid.clone());
        stack.advance(Duration::from_millis(30));
        stack.play(top);

        assert!(!stack.remove(&mid));
        assert_eq!(stack.elapsed(&base), Some(Duration::from_millis(80)));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn removing_the_last_effect_reports_empty() {
        let mut stack = EffectStack::new();
        let fx = constant(0.5, None);
        stack.play(fx.clone());
        stack.advance(Duration::from_millis(16));
        assert!(stack.remove(&fx));
        assert!(stack.is_empty());
        assert_eq!(stack.advance(Duration::from_millis(16)), None);
    }

    #[test]
    fn removing_an_absent_effect_is_a_noop() {
        let mut stack = EffectStack::new();
        let present = constant(0.5, None);
        let absent = constant(0.5, None);
        stack.play(present);
        assert!(!stack.remove(&absent));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn dual_clear_is_both_motors_off() {
        let mut stack: EffectStack<DualRumble> = EffectStack::new();
        let fx: Rc<dyn HapticEffect<DualRumble>> = Rc::new(
            ConstantEffect::<DualRumble>::new(
                RumbleLevels { high: 0.9, low: 0.4 },
                Some(Duration::from_millis(20)),
            ),
        );
        stack.play(fx);
        assert_eq!(
            stack.advance(Duration::from_millis(10)),
            Some(RumbleLevels { high: 0.9, low: 0.4 })
        );
        assert_eq!(
            stack.advance(Duration::from_millis(10)),
            Some(RumbleLevels { high: 0.0, low: 0.0 })
        );
    }
}
