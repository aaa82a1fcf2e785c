#![cfg(target_os = "windows")]

//! Windows DirectInput 8 backend.
//!
//! - **ffi**: `dinput.h` structs, constants, COM vtables and the
//!   `c_dfDIJoystick` data format built in Rust
//! - **com**: [`ComPtr`](com::ComPtr), one owned COM reference
//! - **dinput8**: [`DInput8`] / [`DInputDevice`] implementing the backend traits
//!
//! Most users should not interact with these modules directly. Prefer the
//! high-level API:
//! - [`DirectInput::new`](crate::DirectInput) to acquire the subsystem
//! - `devices().iter()` to enumerate and open controllers
//! - [`Joystick::state`](crate::Joystick::state) to read them

pub mod com;
pub mod dinput8;
pub mod ffi;

pub use dinput8::{DInput8, DInputDevice};
