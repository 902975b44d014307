//! Synthetic output devices.

use evdevil::event::{Abs, Key, Rel};
use evdevil::uinput::{AbsSetup, UinputDevice};
use evdevil::{AbsInfo, InputProp};

use crate::error::Error;
use crate::geometry::{ScreenGeometry, TrackpadRegion};
use crate::slots::SLOT_COUNT;

pub const TRACKPAD_NAME: &str = "Trackscreen";
pub const SIDEKEY_NAME: &str = "Trackscreen Sidekey";
pub const POINTER_NAME: &str = "Trackscreen Pointer";

const TRACKPAD_KEYS: [Key; 7] = [
    Key::BTN_LEFT,
    Key::BTN_TOUCH,
    Key::BTN_TOOL_FINGER,
    Key::BTN_TOOL_DOUBLETAP,
    Key::BTN_TOOL_TRIPLETAP,
    Key::BTN_TOOL_QUADTAP,
    Key::BTN_TOOL_QUINTTAP,
];

/// Absolute trackpad sized to the region, in region-local coordinates.
pub fn create_trackpad(
    screen: &ScreenGeometry,
    region: &TrackpadRegion,
) -> Result<UinputDevice, Error> {
    let width = region.width();
    let height = region.height();
    let pressure = AbsInfo::new(screen.pressure_min, screen.pressure_max);

    let axes = [
        AbsSetup::new(Abs::X, AbsInfo::new(0, width).with_resolution(screen.resolution_x)),
        AbsSetup::new(Abs::Y, AbsInfo::new(0, height).with_resolution(screen.resolution_y)),
        AbsSetup::new(Abs::PRESSURE, pressure),
        AbsSetup::new(Abs::MT_SLOT, AbsInfo::new(0, (SLOT_COUNT - 1) as i32)),
        AbsSetup::new(Abs::MT_TOUCH_MAJOR, AbsInfo::new(0, width.max(height))),
        AbsSetup::new(Abs::MT_TOUCH_MINOR, AbsInfo::new(0, width.max(height))),
        AbsSetup::new(
            Abs::MT_POSITION_X,
            AbsInfo::new(0, width).with_resolution(screen.resolution_x),
        ),
        AbsSetup::new(
            Abs::MT_POSITION_Y,
            AbsInfo::new(0, height).with_resolution(screen.resolution_y),
        ),
        AbsSetup::new(Abs::MT_TRACKING_ID, AbsInfo::new(-1, 65535)),
        AbsSetup::new(Abs::MT_PRESSURE, pressure),
    ];

    // POINTER + BUTTONPAD: a touchpad with an integrated button, not a direct touchscreen.
    let device = UinputDevice::builder()
        .map_err(Error::setup("open /dev/uinput"))?
        .with_props([InputProp::POINTER, InputProp::BUTTONPAD])
        .map_err(Error::setup("trackpad properties"))?
        .with_keys(TRACKPAD_KEYS)
        .map_err(Error::setup("trackpad keys"))?
        .with_abs_axes(axes)
        .map_err(Error::setup("trackpad axes"))?
        .build(TRACKPAD_NAME)
        .map_err(Error::setup("trackpad create"))?;

    finish_setup(device, "trackpad")
}

/// Keyboard exposing a single key.
pub fn create_sidekey(key: Key) -> Result<UinputDevice, Error> {
    let device = UinputDevice::builder()
        .map_err(Error::setup("open /dev/uinput"))?
        .with_keys([key])
        .map_err(Error::setup("sidekey key"))?
        .build(SIDEKEY_NAME)
        .map_err(Error::setup("sidekey create"))?;

    finish_setup(device, "sidekey")
}

/// Relative mouse for the pointer translation mode.
pub fn create_pointer() -> Result<UinputDevice, Error> {
    let device = UinputDevice::builder()
        .map_err(Error::setup("open /dev/uinput"))?
        .with_props([InputProp::POINTER])
        .map_err(Error::setup("pointer properties"))?
        .with_rel_axes([Rel::X, Rel::Y])
        .map_err(Error::setup("pointer axes"))?
        .with_keys([Key::BTN_LEFT, Key::BTN_RIGHT])
        .map_err(Error::setup("pointer keys"))?
        .build(POINTER_NAME)
        .map_err(Error::setup("pointer create"))?;

    finish_setup(device, "pointer")
}

fn finish_setup(device: UinputDevice, what: &'static str) -> Result<UinputDevice, Error> {
    device
        .set_nonblocking(true)
        .map_err(Error::setup("non-blocking mode"))?;
    if let Ok(name) = device.sysname() {
        log::info!(
            "{} device ready: /sys/devices/virtual/input/{}",
            what,
            name.to_string_lossy()
        );
    }
    Ok(device)
}
