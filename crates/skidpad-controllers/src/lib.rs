//! Controller input for the skidpad racing demo.
//!
//! Normalizes heterogeneous physical input devices (legacy joysticks and
//! mapped game controllers) into one timestamped event stream, with
//! jitter-damped analog axes and a stacked haptic-effect scheduler per
//! device. Everything runs synchronously inside the caller's frame loop:
//! feed raw SDL events to the [`Collection`], call [`Collection::advance`]
//! once per frame, then [`Collection::drain_events`].

mod classic;
mod collection;
mod device;
mod effects;
mod error;
mod event;
mod flex;
mod haptics;
mod smoothing;
mod types;

pub use crate::classic::ClassicPad;
pub use crate::collection::Collection;
pub use crate::device::Device;
pub use crate::effects::{ConstantEffect, DualPulseEffect, TickEffect};
pub use crate::error::{ControllerError, Result};
pub use crate::event::{ControllerEvent, EventKind};
pub use crate::flex::FlexPad;
pub use crate::haptics::{
    DualRumble, EffectStack, HapticEffect, Motor, RumbleLevels, SingleRumble,
};
pub use crate::smoothing::{RawSmoothing, Smoothing};
pub use crate::types::{Axis, Button, DeviceId, Kind};
