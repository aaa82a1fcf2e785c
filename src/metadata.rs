//! Device metadata snapshot.
//!
//! [`DeviceMeta`] is a lightweight, cloneable description of a controller
//! suitable for UI display, logging, and persistence. It is built from one
//! `GetDeviceInfo` call; nothing is cached on the joystick itself.
//!
//! ## Persistence notes
//! - `vid`/`pid` come from the product GUID and are stable across ports.
//! - The instance GUID is stable per machine for the same physical device in
//!   the same port; treat it as the primary key and the names as fallbacks.

use serde::{Deserialize, Serialize};

use crate::device::DeviceInstance;
use crate::guid::Guid;

/// `DI8DEVTYPE_*` values found in the low byte of `dwDevType`.
pub const DI8DEVTYPE_JOYSTICK: u8 = 0x14;
pub const DI8DEVTYPE_GAMEPAD: u8 = 0x15;
pub const DI8DEVTYPE_DRIVING: u8 = 0x16;
pub const DI8DEVTYPE_FLIGHT: u8 = 0x17;
pub const DI8DEVTYPE_1STPERSON: u8 = 0x18;
pub const DI8DEVTYPE_SUPPLEMENTAL: u8 = 0x1C;

/// `DIDEVTYPE_HID`: device is a HID device.
const DIDEVTYPE_HID: u32 = 0x0001_0000;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeta {
    pub instance: Guid,
    pub product: Guid,

    /// USB Vendor ID, when the product GUID carries one.
    pub vid: Option<u16>,

    /// USB Product ID, when the product GUID carries one.
    pub pid: Option<u16>,

    pub instance_name: String,
    pub product_name: String,

    /// `DI8DEVTYPE_*` (low byte of `dwDevType`).
    pub dev_type: u8,

    /// Subtype (second byte of `dwDevType`).
    pub dev_subtype: u8,

    /// Reported through the HID stack.
    pub hid: bool,

    /// HID usage page/usage, meaningful when `hid` is set.
    pub usage_page: u16,
    pub usage: u16,
}

impl DeviceMeta {
    pub fn from_instance(info: &DeviceInstance) -> Self {
        let (vid, pid) = match info.product.vid_pid() {
            Some((v, p)) => (Some(v), Some(p)),
            None => (None, None),
        };
        Self {
            instance: info.instance,
            product: info.product,
            vid,
            pid,
            instance_name: info.instance_name.clone(),
            product_name: info.product_name.clone(),
            dev_type: (info.dev_type & 0xFF) as u8,
            dev_subtype: ((info.dev_type >> 8) & 0xFF) as u8,
            hid: info.dev_type & DIDEVTYPE_HID != 0,
            usage_page: info.usage_page,
            usage: info.usage,
        }
    }

    /// Short label for the device type.
    pub fn type_label(&self) -> &'static str {
        match self.dev_type {
            DI8DEVTYPE_JOYSTICK => "joystick",
            DI8DEVTYPE_GAMEPAD => "gamepad",
            DI8DEVTYPE_DRIVING => "driving",
            DI8DEVTYPE_FLIGHT => "flight",
            DI8DEVTYPE_1STPERSON => "first-person",
            DI8DEVTYPE_SUPPLEMENTAL => "supplemental",
            _ => "other",
        }
    }
}
