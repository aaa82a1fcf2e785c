//! Native backends for `dijoy`.
//!
//! A backend provides the subsystem handle ([`InputApi`], the
//! `IDirectInput8W` surface) and its device type ([`DeviceApi`]).
//!
//! - **`windows`**: COM DirectInput 8 via `windows-sys` (Windows only).
//! - **`virtual_input`**: in-memory controllers for tests, demos and
//!   headless hosts (all platforms).
//!
//! ## Reference counting
//! `InputApi: Clone` stands in for `AddRef`; dropping a clone is `Release`.
//! Every wrapper in [`input`](crate::input) and [`joystick`](crate::joystick)
//! holds its own clone, so the native object outlives all of them.

use crate::device::DeviceApi;
use crate::error::Result;
use crate::guid::Guid;

#[cfg(windows)]
#[cfg_attr(docsrs, doc(cfg(windows)))]
pub mod windows;

pub mod virtual_input;

/// Subsystem-level operations (`IDirectInput8W`).
pub trait InputApi: Clone {
    type Device: DeviceApi;

    /// `EnumDevices(DI8DEVCLASS_GAMECTRL, DIEDFL_ATTACHEDONLY)`, instance GUIDs
    /// in enumeration order.
    fn enum_game_controllers(&self) -> Result<Vec<Guid>>;

    /// `CreateDevice(instance)`.
    fn create_device(&self, instance: &Guid) -> Result<Self::Device>;
}

/// Platform default backend.
#[cfg(windows)]
pub type NativeApi = windows::DInput8;

/// Create the platform's native subsystem handle.
#[cfg(windows)]
pub fn native_api() -> Result<NativeApi> {
    windows::DInput8::create()
}
