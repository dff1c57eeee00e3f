use std::rc::Rc;
use std::time::Duration;

use sdl2::event::Event;
use sdl2::joystick::{HatState, Joystick};
use sdl2::HapticSubsystem;

use crate::collection::Hardware;
use crate::event::{EventBuf, EventData, EventKind};
use crate::haptics::{HapticEffect, SingleMotor, SingleRumble};
use crate::smoothing::Smoothing;
use crate::types::{Axis, Button, DeviceId, Kind};

/// Damping time constant for the twist axis, in seconds.
const TWIST_RC: f64 = 0.1;

/// A legacy fixed-mapping device: a plain SDL joystick with a small
/// hard-wired index table. One analog axis (twist) is jitter-damped; the
/// hat decomposes into two perpendicular dpad axes. Carries at most one
/// single-motor haptic driver.
pub struct ClassicPad {
    id: DeviceId,
    name: String,
    raw: Option<Joystick>,
    hat: (f64, f64),
    twist: Smoothing,
    haptic: Option<SingleMotor>,
    last_timestamp: u32,
}

impl ClassicPad {
    pub(crate) fn open(joystick: Joystick, haptic: &HapticSubsystem) -> Self {
        let id = joystick.instance_id();
        let driver = if joystick.has_rumble() {
            SingleMotor::open(haptic, id)
        } else {
            None
        };
        Self {
            id,
            name: joystick.name(),
            raw: Some(joystick),
            hat: (0.0, 0.0),
            twist: Smoothing::new(TWIST_RC),
            haptic: driver,
            last_timestamp: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn detached(id: DeviceId) -> Self {
        Self {
            id,
            name: format!("classic {id}"),
            raw: None,
            hat: (0.0, 0.0),
            twist: Smoothing::new(TWIST_RC),
            haptic: None,
            last_timestamp: 0,
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn kind(&self) -> Kind {
        Kind::Classic
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Smoothed twist position, in [-1, 1].
    pub fn twist(&self) -> f64 {
        self.twist.value()
    }

    pub fn play_haptic_effect(&mut self, effect: Rc<dyn HapticEffect<SingleRumble>>) {
        if let Some(haptic) = self.haptic.as_mut() {
            haptic.play(effect);
        }
    }

    pub fn remove_haptic_effect(&mut self, effect: &Rc<dyn HapticEffect<SingleRumble>>) {
        if let Some(haptic) = self.haptic.as_mut() {
            haptic.remove(effect);
        }
    }

    pub(crate) fn handle_event(&mut self, evt: &Event, out: &mut EventBuf) {
        match *evt {
            Event::JoyAxisMotion { timestamp, axis_idx, value, .. } => {
                self.last_timestamp = timestamp;
                let axis = convert_axis(axis_idx);
                let value = convert_axis_value(value);
                if axis == Axis::StickTwist {
                    // Damped; motion surfaces from advance().
                    self.twist.set_target(value);
                } else {
                    out.push(EventData {
                        timestamp,
                        kind: EventKind::AxisMotion { axis, value },
                    });
                }
            }
            Event::JoyHatMotion { timestamp, state, .. } => {
                self.last_timestamp = timestamp;
                let (x, y) = hat_position(state);
                if x != self.hat.0 {
                    out.push(EventData {
                        timestamp,
                        kind: EventKind::AxisMotion { axis: Axis::DpadX, value: x },
                    });
                }
                if y != self.hat.1 {
                    out.push(EventData {
                        timestamp,
                        kind: EventKind::AxisMotion { axis: Axis::DpadY, value: y },
                    });
                }
                self.hat = (x, y);
            }
            Event::JoyButtonDown { timestamp, button_idx, .. } => {
                self.last_timestamp = timestamp;
                out.push(EventData {
                    timestamp,
                    kind: EventKind::ButtonDown { button: convert_button(button_idx) },
                });
            }
            Event::JoyButtonUp { timestamp, button_idx, .. } => {
                self.last_timestamp = timestamp;
                out.push(EventData {
                    timestamp,
                    kind: EventKind::ButtonUp { button: convert_button(button_idx) },
                });
            }
            _ => {}
        }
    }

    pub(crate) fn advance(&mut self, dt: Duration, out: &mut EventBuf) {
        if let Some(haptic) = self.haptic.as_mut() {
            haptic.advance(dt);
        }
        let delta = self.twist.advance(dt);
        if delta != 0.0 {
            out.push(EventData {
                timestamp: self.last_timestamp,
                kind: EventKind::AxisMotion {
                    axis: Axis::StickTwist,
                    value: self.twist.value(),
                },
            });
        }
    }

    pub(crate) fn reopen(&mut self, hw: &Hardware) {
        let Some(index) = hw.device_index(self.id) else {
            log::warn!("reopen: device {} is gone", self.id);
            self.detach();
            return;
        };
        match hw.joystick.open(index) {
            Ok(joystick) => {
                self.name = joystick.name();
                let has_rumble = joystick.has_rumble();
                if let Some(haptic) = self.haptic.as_mut() {
                    haptic.reattach(&hw.haptic, self.id, has_rumble);
                } else if has_rumble {
                    self.haptic = SingleMotor::open(&hw.haptic, self.id);
                }
                self.raw = Some(joystick);
            }
            Err(err) => {
                log::warn!("reopen failed for device {}: {err}", self.id);
                self.detach();
            }
        }
    }

    pub(crate) fn detach(&mut self) {
        self.raw = None;
        if let Some(haptic) = self.haptic.as_mut() {
            haptic.detach();
        }
    }
}

fn convert_axis(index: u8) -> Axis {
    match index {
        0 => Axis::StickX,
        1 => Axis::StickY,
        2 => Axis::StickTwist,
        _ => Axis::Invalid,
    }
}

fn convert_axis_value(value: i16) -> f64 {
    (f64::from(value) / 32767.0).clamp(-1.0, 1.0)
}

fn convert_button(index: u8) -> Button {
    match index {
        0 => Button::A,
        1 => Button::B,
        2 => Button::X,
        3 => Button::Y,
        4 => Button::Lb,
        5 => Button::Rb,
        6 => Button::Back,
        7 => Button::Menu,
        _ => Button::Invalid,
    }
}

/// Hat positions use the screen convention: up is negative y.
fn hat_position(state: HatState) -> (f64, f64) {
    match state {
        HatState::Centered => (0.0, 0.0),
        HatState::Up => (0.0, -1.0),
        HatState::RightUp => (1.0, -1.0),
        HatState::Right => (1.0, 0.0),
        HatState::RightDown => (1.0, 1.0),
        HatState::Down => (0.0, 1.0),
        HatState::LeftDown => (-1.0, 1.0),
        HatState::Left => (-1.0, 0.0),
        HatState::LeftUp => (-1.0, -1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::SmallVec;

    fn events_for(pad: &mut ClassicPad, evt: &Event) -> EventBuf {
        let mut out: EventBuf = SmallVec::new();
        pad.handle_event(evt, &mut out);
        out
    }

    fn hat(state: HatState) -> Event {
        Event::JoyHatMotion { timestamp: 10, which: 1, hat_idx: 0, state }
    }

    #[test]
    fn hat_up_is_exactly_one_y_axis_event() {
        let mut pad = ClassicPad::detached(1);
        let out = events_for(&mut pad, &hat(HatState::Up));
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].kind,
            EventKind::AxisMotion { axis: Axis::DpadY, value: -1.0 }
        );
    }

    #[test]
    fn hat_reports_only_changed_components() {
        let mut pad = ClassicPad::detached(1);
        events_for(&mut pad, &hat(HatState::Up));
        // Up -> RightUp: y is already -1, only x moves.
        let out = events_for(&mut pad, &hat(HatState::RightUp));
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].kind,
            EventKind::AxisMotion { axis: Axis::DpadX, value: 1.0 }
        );
        // Back to centered: both return to rest.
        let out = events_for(&mut pad, &hat(HatState::Centered));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn stick_axes_pass_through_normalized() {
        let mut pad = ClassicPad::detached(1);
        let out = events_for(
            &mut pad,
            &Event::JoyAxisMotion { timestamp: 5, which: 1, axis_idx: 0, value: i16::MIN },
        );
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].kind,
            EventKind::AxisMotion { axis: Axis::StickX, value: -1.0 }
        );
    }

    #[test]
    fn unknown_axis_decodes_to_the_invalid_sentinel() {
        let mut pad = ClassicPad::detached(1);
        let out = events_for(
            &mut pad,
            &Event::JoyAxisMotion { timestamp: 5, which: 1, axis_idx: 9, value: 100 },
        );
        assert_eq!(out.len(), 1);
        assert!(matches!(
            out[0].kind,
            EventKind::AxisMotion { axis: Axis::Invalid, .. }
        ));
    }

    #[test]
    fn button_table_maps_and_falls_back_to_invalid() {
        let mut pad = ClassicPad::detached(1);
        let out = events_for(
            &mut pad,
            &Event::JoyButtonDown { timestamp: 5, which: 1, button_idx: 0 },
        );
        assert_eq!(out[0].kind, EventKind::ButtonDown { button: Button::A });
        let out = events_for(
            &mut pad,
            &Event::JoyButtonUp { timestamp: 6, which: 1, button_idx: 12 },
        );
        assert_eq!(out[0].kind, EventKind::ButtonUp { button: Button::Invalid });
    }

    #[test]
    fn twist_surfaces_from_advance_not_from_the_raw_report() {
        let mut pad = ClassicPad::detached(1);
        let out = events_for(
            &mut pad,
            &Event::JoyAxisMotion { timestamp: 7, which: 1, axis_idx: 2, value: i16::MAX },
        );
        assert!(out.is_empty());

        let mut out: EventBuf = SmallVec::new();
        pad.advance(Duration::from_millis(16), &mut out);
        assert_eq!(out.len(), 1);
        let EventKind::AxisMotion { axis, value } = out[0].kind else {
            panic!("expected axis motion, got {:?}", out[0].kind);
        };
        assert_eq!(axis, Axis::StickTwist);
        assert_eq!(out[0].timestamp, 7);
        assert!(value > 0.0 && value < 1.0);
        assert_eq!(value, pad.twist());
    }

    #[test]
    fn detach_preserves_identity_and_damping_state() {
        let mut pad = ClassicPad::detached(1);
        events_for(
            &mut pad,
            &Event::JoyAxisMotion { timestamp: 7, which: 1, axis_idx: 2, value: i16::MAX },
        );
        let mut out: EventBuf = SmallVec::new();
        pad.advance(Duration::from_millis(16), &mut out);
        let mid = pad.twist();
        assert!(mid > 0.0);

        pad.detach();
        assert_eq!(pad.id(), 1);
        assert_eq!(pad.twist(), mid);

        // The damper keeps converging toward the pending target after the
        // hardware handle is gone.
        out.clear();
        pad.advance(Duration::from_millis(16), &mut out);
        assert_eq!(out.len(), 1);
        assert!(pad.twist() > mid);
    }

    #[test]
    fn quiet_pad_advances_without_events() {
        let mut pad = ClassicPad::detached(1);
        let mut out: EventBuf = SmallVec::new();
        pad.advance(Duration::from_millis(16), &mut out);
        assert!(out.is_empty());
    }
}
