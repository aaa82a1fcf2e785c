//! dijoy: DirectInput 8 game controllers for Rust.
//!
//! Enumerates attached joysticks and gamepads, configures their axes once at
//! open time (absolute mode, logical range, deadzone) and reads polled state.
//!
//! - [`DirectInput`] owns the subsystem; [`DirectInput::devices`] enumerates.
//! - [`Joystick`] is one open device; [`Joystick::state`] polls it.
//! - [`ControllerService`] tracks one selected controller and publishes
//!   [`ControllerEvent`]s through an [`InputEventBus`].
//!
//! The native backend exists on Windows only. [`backends::virtual_input`]
//! implements the same traits in memory and runs everywhere.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backends;
pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod filtered_listener;
pub mod guid;
pub mod input;
pub mod joystick;
pub mod logger;
pub mod manager;
pub mod metadata;
pub mod state;

pub use backends::InputApi;
pub use config::{AxisConfig, Config};
pub use controller::{ControllerIdentity, ControllerState, Substate};
pub use device::DeviceApi;
pub use error::{Error, HResult, Result};
pub use event::*;
pub use eventbus::*;
pub use filtered_listener::FilteredListener;
pub use guid::Guid;
pub use input::{DeviceCollection, DeviceEnumerator, DirectInput};
pub use joystick::Joystick;
pub use logger::LogListener;
pub use manager::*;
pub use metadata::DeviceMeta;
pub use state::{JoystickState, ObjectCounts};
