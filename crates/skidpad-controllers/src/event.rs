use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::device::Device;
use crate::types::{Axis, Button};

/// What happened, with its kind-specific payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    DeviceAdded,
    DeviceRemoved,
    AxisMotion { axis: Axis, value: f64 },
    ButtonDown { button: Button },
    ButtonUp { button: Button },
}

/// A normalized input event. Immutable once constructed.
///
/// The source reference is strong: an event keeps its device alive even
/// after the collection has pruned it, so consumers may hold drained events
/// as long as they like.
#[derive(Clone)]
pub struct ControllerEvent {
    timestamp: u32,
    source: Rc<RefCell<Device>>,
    kind: EventKind,
}

impl ControllerEvent {
    /// Hardware tick count (milliseconds) at which the raw report arrived.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// The device this event originated from. Never dangling, but it may
    /// name a device that has since been removed.
    pub fn source(&self) -> &Rc<RefCell<Device>> {
        &self.source
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Whether this event was produced by the given device instance.
    pub fn is_from(&self, device: &Rc<RefCell<Device>>) -> bool {
        Rc::ptr_eq(&self.source, device)
    }
}

/// An event a device emitted, not yet bound to its source. The collection
/// holds the owning reference to the device, so it does the binding; this
/// keeps devices free of self-references.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EventData {
    pub(crate) timestamp: u32,
    pub(crate) kind: EventKind,
}

impl EventData {
    pub(crate) fn bind(self, source: Rc<RefCell<Device>>) -> ControllerEvent {
        ControllerEvent { timestamp: self.timestamp, source, kind: self.kind }
    }
}

/// Per-call output buffer for device translation. A single raw report
/// decomposes into at most a couple of events.
pub(crate) type EventBuf = SmallVec<[EventData; 4]>;
