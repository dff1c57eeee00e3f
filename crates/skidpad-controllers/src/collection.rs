use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use sdl2::event::Event;
use sdl2::{GameControllerSubsystem, HapticSubsystem, JoystickSubsystem, Sdl};

use crate::classic::ClassicPad;
use crate::device::Device;
use crate::error::{ControllerError, Result};
use crate::event::{ControllerEvent, EventBuf, EventData, EventKind};
use crate::flex::FlexPad;
use crate::types::DeviceId;

/// SDL subsystem handles the collection opens devices through.
pub(crate) struct Hardware {
    pub(crate) joystick: JoystickSubsystem,
    pub(crate) controller: GameControllerSubsystem,
    pub(crate) haptic: HapticSubsystem,
}

impl Hardware {
    /// Current device index for an instance id, for reopening in place.
    pub(crate) fn device_index(&self, id: DeviceId) -> Option<u32> {
        let count = self.joystick.num_joysticks().ok()?;
        (0..count).find(|&index| {
            self.joystick
                .open(index)
                .map(|joystick| joystick.instance_id() == id)
                .unwrap_or(false)
        })
    }
}

/// The set of live controllers. Routes raw hardware reports to the right
/// device, accumulates the normalized events they produce, and hands them
/// to the consumer once per frame via [`Collection::drain_events`].
///
/// Removed devices move to a weak holding area instead of being dropped:
/// events still in flight hold strong references, so a device stays alive
/// exactly as long as something can still observe it.
pub struct Collection {
    hw: Option<Hardware>,
    devices: Vec<Rc<RefCell<Device>>>,
    retired: Vec<Weak<RefCell<Device>>>,
    pending: Vec<ControllerEvent>,
}

impl Collection {
    /// Initializes the joystick, game-controller and haptic subsystems.
    /// Devices already connected at startup arrive through the normal
    /// attach notifications on the first event pump.
    pub fn new(sdl: &Sdl) -> Result<Self> {
        let joystick = sdl.joystick().map_err(ControllerError::BackendInit)?;
        let controller =
            sdl.game_controller().map_err(ControllerError::BackendInit)?;
        let haptic = sdl.haptic().map_err(ControllerError::BackendInit)?;
        Ok(Self {
            hw: Some(Hardware { joystick, controller, haptic }),
            devices: Vec::new(),
            retired: Vec::new(),
            pending: Vec::new(),
        })
    }

    /// Consumes one raw hardware report. Returns whether the report was
    /// recognized, so the caller can fall through to its own handling for
    /// anything else (window events, quit keys, ...).
    pub fn handle_event(&mut self, evt: &Event) -> bool {
        match *evt {
            Event::JoyDeviceAdded { timestamp, which } => {
                self.attach_joystick(which, timestamp);
                true
            }
            Event::ControllerDeviceAdded { timestamp, which } => {
                self.attach_controller(which, timestamp);
                true
            }
            Event::JoyDeviceRemoved { timestamp, which }
            | Event::ControllerDeviceRemoved { timestamp, which } => {
                self.retire(which, timestamp);
                true
            }
            Event::ControllerDeviceRemapped { which, .. } => {
                self.reopen_device(which);
                true
            }
            Event::JoyAxisMotion { which, .. }
            | Event::JoyHatMotion { which, .. }
            | Event::JoyButtonDown { which, .. }
            | Event::JoyButtonUp { which, .. }
            | Event::ControllerAxisMotion { which, .. }
            | Event::ControllerButtonDown { which, .. }
            | Event::ControllerButtonUp { which, .. } => {
                self.route(which, evt);
                true
            }
            _ => false,
        }
    }

    /// Advances every live device by `dt`: haptic engines tick and damped
    /// axis motion flushes into events, appended after everything the raw
    /// reports produced this frame. Also prunes retired devices nothing
    /// references anymore.
    pub fn advance(&mut self, dt: Duration) {
        let mut out = EventBuf::new();
        for device in &self.devices {
            out.clear();
            device.borrow_mut().advance(dt, &mut out);
            self.pending
                .extend(out.drain(..).map(|data| data.bind(device.clone())));
        }
        self.prune();
    }

    /// Returns all events accumulated since the last drain, in production
    /// order, and resets the queue.
    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn find_device(&self, id: DeviceId) -> Option<Rc<RefCell<Device>>> {
        self.devices.iter().find(|d| d.borrow().id() == id).cloned()
    }

    /// Read-only iteration over currently live devices.
    pub fn iter(&self) -> std::slice::Iter<'_, Rc<RefCell<Device>>> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn attach_joystick(&mut self, which: u32, timestamp: u32) {
        let pad = {
            let Some(hw) = self.hw.as_ref() else { return };
            // Mapped controllers attach through the controller family.
            if hw.controller.is_game_controller(which) {
                return;
            }
            match hw.joystick.open(which) {
                Ok(joystick) => ClassicPad::open(joystick, &hw.haptic),
                Err(err) => {
                    log::warn!("failed to open joystick {which}: {err}");
                    return;
                }
            }
        };
        if self.find_device(pad.id()).is_none() {
            self.register(Device::Classic(pad), timestamp);
        }
    }

    fn attach_controller(&mut self, which: u32, timestamp: u32) {
        let pad = {
            let Some(hw) = self.hw.as_ref() else { return };
            match hw.controller.open(which) {
                Ok(controller) => {
                    let id = hw
                        .joystick
                        .open(which)
                        .map(|joystick| joystick.instance_id())
                        .unwrap_or(which);
                    FlexPad::open(controller, id)
                }
                Err(err) => {
                    log::warn!("failed to open controller {which}: {err}");
                    return;
                }
            }
        };
        if self.find_device(pad.id()).is_none() {
            self.register(Device::Flex(pad), timestamp);
        }
    }

    fn register(&mut self, device: Device, timestamp: u32) {
        log::debug!(
            "device {} attached: {} ({})",
            device.id(),
            device.name(),
            device.kind()
        );
        let device = Rc::new(RefCell::new(device));
        self.devices.push(device.clone());
        self.pending
            .push(EventData { timestamp, kind: EventKind::DeviceAdded }.bind(device));
    }

    /// Removal arrives through both report families for mapped
    /// controllers; the second notification finds nothing and is ignored.
    fn retire(&mut self, id: DeviceId, timestamp: u32) {
        let Some(pos) = self.devices.iter().position(|d| d.borrow().id() == id)
        else {
            return;
        };
        let device = self.devices.remove(pos);
        device.borrow_mut().detach();
        log::debug!("device {id} removed");
        self.retired.push(Rc::downgrade(&device));
        self.pending
            .push(EventData { timestamp, kind: EventKind::DeviceRemoved }.bind(device));
    }

    fn reopen_device(&self, id: DeviceId) {
        let Some(hw) = self.hw.as_ref() else { return };
        if let Some(device) = self.devices.iter().find(|d| d.borrow().id() == id) {
            log::debug!("device {id} reopening in place");
            device.borrow_mut().reopen(hw);
        }
    }

    fn route(&mut self, id: DeviceId, evt: &Event) {
        let Some(device) = self.find_device(id) else { return };
        let mut out = EventBuf::new();
        device.borrow_mut().handle_event(evt, &mut out);
        self.pending
            .extend(out.into_iter().map(|data| data.bind(device.clone())));
    }

    /// Routine cleanup: drop holding-area entries once no event or
    /// consumer keeps the device alive.
    fn prune(&mut self) {
        self.retired.retain(|weak| weak.strong_count() > 0);
    }
}
