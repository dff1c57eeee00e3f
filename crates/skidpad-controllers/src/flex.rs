use std::rc::Rc;
use std::time::Duration;

use sdl2::controller::{Axis as SdlAxis, Button as SdlButton, GameController};
use sdl2::event::Event;

use crate::collection::Hardware;
use crate::event::{EventBuf, EventData, EventKind};
use crate::haptics::{DualRumble, EffectStack, HapticEffect, RumbleLevels, RUMBLE_SLICE_MS};
use crate::types::{Axis, Button, DeviceId, Kind};

/// A flexible-mapping device: an SDL game controller whose layout comes
/// from the platform's mapping database. Modern pads expose dual-motor
/// rumble through the controller API; those get an effect stack, the rest
/// don't and all haptic calls are no-ops.
pub struct FlexPad {
    id: DeviceId,
    kind: Kind,
    name: String,
    raw: Option<GameController>,
    stack: Option<EffectStack<DualRumble>>,
    last_timestamp: u32,
}

impl FlexPad {
    pub(crate) fn open(controller: GameController, id: DeviceId) -> Self {
        let has_rumble = controller.has_rumble();
        Self {
            id,
            kind: if has_rumble { Kind::Modern } else { Kind::Generic },
            name: controller.name(),
            raw: Some(controller),
            stack: has_rumble.then(EffectStack::new),
            last_timestamp: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn detached(id: DeviceId) -> Self {
        Self {
            id,
            kind: Kind::Generic,
            name: format!("flex {id}"),
            raw: None,
            stack: None,
            last_timestamp: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn detached_rumble(id: DeviceId) -> Self {
        Self { kind: Kind::Modern, stack: Some(EffectStack::new()), ..Self::detached(id) }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The platform mapping string this pad was opened with, when the
    /// hardware is attached.
    pub fn mapping(&self) -> Option<String> {
        self.raw.as_ref().map(GameController::mapping)
    }

    pub fn play_haptic_effect(&mut self, effect: Rc<dyn HapticEffect<DualRumble>>) {
        if let Some(stack) = self.stack.as_mut() {
            stack.play(effect);
        }
    }

    pub fn remove_haptic_effect(&mut self, effect: &Rc<dyn HapticEffect<DualRumble>>) {
        if let Some(stack) = self.stack.as_mut() {
            if stack.remove(effect) {
                apply(&mut self.raw, RumbleLevels { high: 0.0, low: 0.0 });
            }
        }
    }

    pub(crate) fn handle_event(&mut self, evt: &Event, out: &mut EventBuf) {
        match *evt {
            Event::ControllerAxisMotion { timestamp, axis, value, .. } => {
                self.last_timestamp = timestamp;
                out.push(EventData {
                    timestamp,
                    kind: EventKind::AxisMotion {
                        axis: convert_axis(axis),
                        value: convert_axis_value(axis, value),
                    },
                });
            }
            Event::ControllerButtonDown { timestamp, button, .. } => {
                self.last_timestamp = timestamp;
                out.push(EventData { timestamp, kind: press_kind(button, true) });
            }
            Event::ControllerButtonUp { timestamp, button, .. } => {
                self.last_timestamp = timestamp;
                out.push(EventData { timestamp, kind: press_kind(button, false) });
            }
            _ => {}
        }
    }

    pub(crate) fn advance(&mut self, dt: Duration, _out: &mut EventBuf) {
        if let Some(stack) = self.stack.as_mut() {
            if let Some(levels) = stack.advance(dt) {
                apply(&mut self.raw, levels);
            }
        }
    }

    pub(crate) fn reopen(&mut self, hw: &Hardware) {
        let Some(index) = hw.device_index(self.id) else {
            log::warn!("reopen: device {} is gone", self.id);
            self.detach();
            return;
        };
        match hw.controller.open(index) {
            Ok(controller) => {
                self.name = controller.name();
                self.raw = Some(controller);
            }
            Err(err) => {
                log::warn!("reopen failed for device {}: {err}", self.id);
                self.detach();
            }
        }
    }

    pub(crate) fn detach(&mut self) {
        self.raw = None;
    }
}

fn apply(raw: &mut Option<GameController>, levels: RumbleLevels) {
    let Some(controller) = raw.as_mut() else {
        return;
    };
    let low = (levels.low.clamp(0.0, 1.0) * 65535.0) as u16;
    let high = (levels.high.clamp(0.0, 1.0) * 65535.0) as u16;
    if let Err(err) = controller.set_rumble(low, high, RUMBLE_SLICE_MS) {
        log::warn!("rumble write failed: {err}");
    }
}

fn convert_axis(axis: SdlAxis) -> Axis {
    match axis {
        SdlAxis::LeftX => Axis::LeftStickX,
        SdlAxis::LeftY => Axis::LeftStickY,
        SdlAxis::RightX => Axis::RightStickX,
        SdlAxis::RightY => Axis::RightStickY,
        SdlAxis::TriggerLeft => Axis::LeftTrigger,
        SdlAxis::TriggerRight => Axis::RightTrigger,
    }
}

/// Sticks normalize to [-1, 1]; triggers only travel one way and
/// normalize to [0, 1].
fn convert_axis_value(axis: SdlAxis, value: i16) -> f64 {
    match axis {
        SdlAxis::TriggerLeft | SdlAxis::TriggerRight => {
            (f64::from(value).max(0.0) / 32767.0).clamp(0.0, 1.0)
        }
        _ => (f64::from(value) / 32767.0).clamp(-1.0, 1.0),
    }
}

/// Dpad buttons synthesize signed axis motion so movement input looks the
/// same to consumers whether it came from a stick or a pad. Everything
/// else is a plain button transition; unknown buttons decode to the
/// `Invalid` sentinel rather than failing.
fn press_kind(button: SdlButton, pressed: bool) -> EventKind {
    let dpad = match button {
        SdlButton::DPadUp => Some((Axis::DpadY, -1.0)),
        SdlButton::DPadDown => Some((Axis::DpadY, 1.0)),
        SdlButton::DPadLeft => Some((Axis::DpadX, -1.0)),
        SdlButton::DPadRight => Some((Axis::DpadX, 1.0)),
        _ => None,
    };
    if let Some((axis, direction)) = dpad {
        let value = if pressed { direction } else { 0.0 };
        return EventKind::AxisMotion { axis, value };
    }
    let button = convert_button(button);
    if pressed {
        EventKind::ButtonDown { button }
    } else {
        EventKind::ButtonUp { button }
    }
}

fn convert_button(button: SdlButton) -> Button {
    match button {
        SdlButton::A => Button::A,
        SdlButton::B => Button::B,
        SdlButton::X => Button::X,
        SdlButton::Y => Button::Y,
        SdlButton::LeftShoulder => Button::Lb,
        SdlButton::RightShoulder => Button::Rb,
        SdlButton::LeftStick => Button::Lsb,
        SdlButton::RightStick => Button::Rsb,
        SdlButton::Start => Button::Menu,
        SdlButton::Back => Button::Back,
        SdlButton::Guide => Button::Fuji,
        _ => Button::Invalid,
    }
}
