use std::time::Duration;

use sdl2::event::Event;

use crate::classic::ClassicPad;
use crate::collection::Hardware;
use crate::event::EventBuf;
use crate::flex::FlexPad;
use crate::types::{DeviceId, Kind};

/// A connected (or recently removed) controller. A closed variant over the
/// two device families; consumers match on it to reach family-specific
/// capabilities such as the haptic player.
pub enum Device {
    Classic(ClassicPad),
    Flex(FlexPad),
}

impl Device {
    /// Stable identity assigned at connection time. Immutable for the life
    /// of the device, including across reopens.
    pub fn id(&self) -> DeviceId {
        match self {
            Device::Classic(pad) => pad.id(),
            Device::Flex(pad) => pad.id(),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Device::Classic(pad) => pad.kind(),
            Device::Flex(pad) => pad.kind(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Device::Classic(pad) => pad.name(),
            Device::Flex(pad) => pad.name(),
        }
    }

    /// Translates one raw hardware report into zero or more normalized
    /// events. Reports from the wrong family are ignored; SDL reports
    /// mapped controllers through both families.
    pub(crate) fn handle_event(&mut self, evt: &Event, out: &mut EventBuf) {
        match self {
            Device::Classic(pad) => pad.handle_event(evt, out),
            Device::Flex(pad) => pad.handle_event(evt, out),
        }
    }

    /// Per-frame update: drives the haptic engine and flushes damped axis
    /// motion into events.
    pub(crate) fn advance(&mut self, dt: Duration, out: &mut EventBuf) {
        match self {
            Device::Classic(pad) => pad.advance(dt, out),
            Device::Flex(pad) => pad.advance(dt, out),
        }
    }

    /// Re-acquires the hardware handle in place. Identity, smoothing state
    /// and scheduled haptic effects all survive.
    pub(crate) fn reopen(&mut self, hw: &Hardware) {
        match self {
            Device::Classic(pad) => pad.reopen(hw),
            Device::Flex(pad) => pad.reopen(hw),
        }
    }

    /// Drops the hardware handle. The logical device lives on for any
    /// events still referencing it.
    pub(crate) fn detach(&mut self) {
        match self {
            Device::Classic(pad) => pad.detach(),
            Device::Flex(pad) => pad.detach(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_reaches_the_concrete_family() {
        let classic = Device::Classic(ClassicPad::detached(1));
        assert_eq!(classic.id(), 1);
        assert_eq!(classic.kind(), Kind::Classic);

        let flex = Device::Flex(FlexPad::detached(2));
        assert_eq!(flex.id(), 2);
        assert_eq!(flex.kind(), Kind::Generic);
    }
}
