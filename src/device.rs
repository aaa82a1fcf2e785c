//! Device-level seam between the joystick wrapper and a native backend.
//!
//! [`DeviceApi`] is the subset of `IDirectInputDevice8W` this crate drives. The
//! plain-data types here mirror the native structs closely enough that backends
//! only copy fields:
//! - [`DeviceObject`] ← `DIDEVICEOBJECTINSTANCEW`
//! - [`DeviceInstance`] ← `DIDEVICEINSTANCEW`
//! - [`RawJoyState`] ← `DIJOYSTATE`
//!
//! Backends: [`backends::windows`](crate::backends) (COM) and
//! [`backends::virtual_input`](crate::backends::virtual_input) (in-memory).

use crate::error::Result;
use crate::guid::{Guid, GUID_POV, GUID_SLIDER};

// DIDFT_* object type bits (dinput.h).
pub const DIDFT_ALL: u32 = 0x0000_0000;
pub const DIDFT_RELAXIS: u32 = 0x0000_0001;
pub const DIDFT_ABSAXIS: u32 = 0x0000_0002;
pub const DIDFT_AXIS: u32 = 0x0000_0003;
pub const DIDFT_PSHBUTTON: u32 = 0x0000_0004;
pub const DIDFT_TGLBUTTON: u32 = 0x0000_0008;
pub const DIDFT_BUTTON: u32 = 0x0000_000C;
pub const DIDFT_POV: u32 = 0x0000_0010;
pub const DIDFT_ANYINSTANCE: u32 = 0x00FF_FF00;
pub const DIDFT_OPTIONAL: u32 = 0x8000_0000;

/// `DIDFT_MAKEINSTANCE(n)`.
#[inline]
pub const fn didft_make_instance(n: u16) -> u32 {
    (n as u32) << 8
}

/// Fixed capacities of the `DIJOYSTATE` buffer.
pub const MAX_SLIDERS: usize = 2;
pub const MAX_POVS: usize = 4;
pub const MAX_BUTTONS: usize = 32;

/// One object reported by `EnumObjects`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceObject {
    /// Object type GUID (`GUID_XAxis`, `GUID_Slider`, `GUID_POV`, ...).
    pub guid_type: Guid,
    /// `dwType`: type bits plus instance number; also the `DIPH_BYID` key.
    pub obj_type: u32,
    pub name: String,
}

impl DeviceObject {
    #[inline]
    pub fn is_axis(&self) -> bool {
        self.obj_type & DIDFT_AXIS != 0
    }

    #[inline]
    pub fn is_button(&self) -> bool {
        self.obj_type & DIDFT_BUTTON != 0
    }

    /// POV by type bit, or by type GUID for drivers that only set the latter.
    #[inline]
    pub fn is_pov(&self) -> bool {
        self.obj_type & DIDFT_POV != 0 || self.guid_type == GUID_POV
    }

    #[inline]
    pub fn is_slider(&self) -> bool {
        self.guid_type == GUID_SLIDER
    }
}

/// Identity record returned by `GetDeviceInfo`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceInstance {
    pub instance: Guid,
    pub product: Guid,
    /// `dwDevType`: low byte is the device type, next byte the subtype.
    pub dev_type: u32,
    pub instance_name: String,
    pub product_name: String,
    pub usage_page: u16,
    pub usage: u16,
}

/// Raw `DIJOYSTATE` contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawJoyState {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub rx: i32,
    pub ry: i32,
    pub rz: i32,
    pub sliders: [i32; MAX_SLIDERS],
    /// Hundredths of degrees clockwise from north; `0xFFFF_FFFF` when centered.
    pub povs: [u32; MAX_POVS],
    /// High bit set when pressed; any nonzero byte counts as pressed.
    pub buttons: [u8; MAX_BUTTONS],
}

impl Default for RawJoyState {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            rx: 0,
            ry: 0,
            rz: 0,
            sliders: [0; MAX_SLIDERS],
            povs: [u32::MAX; MAX_POVS],
            buttons: [0; MAX_BUTTONS],
        }
    }
}

/// `DIPROP_AXISMODE` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisMode {
    Absolute,
    Relative,
}

impl AxisMode {
    /// `DIPROPAXISMODE_ABS` / `DIPROPAXISMODE_REL`.
    pub fn raw(self) -> u32 {
        match self {
            AxisMode::Absolute => 0,
            AxisMode::Relative => 1,
        }
    }
}

/// The device COM surface used by [`Joystick`](crate::joystick::Joystick).
///
/// Implementations own exactly one native reference; dropping releases it.
pub trait DeviceApi {
    /// `SetDataFormat(&c_dfDIJoystick)`.
    fn set_joystick_format(&self) -> Result<()>;

    /// `SetProperty(DIPROP_AXISMODE)` for the whole device.
    fn set_axis_mode(&self, mode: AxisMode) -> Result<()>;

    /// `EnumObjects(DIDFT_ALL)`, collected in enumeration order.
    fn objects(&self) -> Result<Vec<DeviceObject>>;

    /// `SetProperty(DIPROP_RANGE)` addressed by object id.
    fn set_range(&self, obj_type: u32, min: i32, max: i32) -> Result<()>;

    /// `SetProperty(DIPROP_DEADZONE)` addressed by object id.
    fn set_deadzone(&self, obj_type: u32, deadzone: u32) -> Result<()>;

    fn acquire(&self) -> Result<()>;

    fn poll(&self) -> Result<()>;

    /// `GetDeviceState(sizeof(DIJOYSTATE))`.
    fn state(&self) -> Result<RawJoyState>;

    /// `GetDeviceInfo`.
    fn info(&self) -> Result<DeviceInstance>;
}
