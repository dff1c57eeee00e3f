use std::fmt;

/// Unique identifier of a controller device. This is the SDL joystick
/// instance id, stable for the lifetime of the connection.
pub type DeviceId = u32;

/// Logical analog input channels. Which subset a device reports is fixed
/// by its kind; indices outside the translation table decode to `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Invalid,
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
    DpadX,
    DpadY,
    StickX,
    StickY,
    StickTwist,
}

/// Logical controller buttons. `Fuji` is the vendor/guide button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Invalid,
    A,
    B,
    X,
    Y,
    Lb,
    Rb,
    Lsb,
    Rsb,
    Menu,
    Back,
    Fuji,
}

/// Device families. The family fixes the translation table and the haptic
/// strategy a consumer should use (single-motor for `Classic`, dual-motor
/// for the flexible-mapping kinds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Classic,
    Generic,
    Modern,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Invalid => "invalid",
            Axis::LeftStickX => "left_stick_x",
            Axis::LeftStickY => "left_stick_y",
            Axis::RightStickX => "right_stick_x",
            Axis::RightStickY => "right_stick_y",
            Axis::LeftTrigger => "left_trigger",
            Axis::RightTrigger => "right_trigger",
            Axis::DpadX => "dpad_x",
            Axis::DpadY => "dpad_y",
            Axis::StickX => "stick_x",
            Axis::StickY => "stick_y",
            Axis::StickTwist => "stick_twist",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Button::Invalid => "invalid",
            Button::A => "a",
            Button::B => "b",
            Button::X => "x",
            Button::Y => "y",
            Button::Lb => "lb",
            Button::Rb => "rb",
            Button::Lsb => "lsb",
            Button::Rsb => "rsb",
            Button::Menu => "menu",
            Button::Back => "back",
            Button::Fuji => "fuji",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Classic => "classic",
            Kind::Generic => "generic",
            Kind::Modern => "modern",
        };
        f.write_str(name)
    }
}
