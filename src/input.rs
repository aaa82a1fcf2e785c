//! Root factory and device enumeration.
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> dijoy::Result<()> {
//! let di = dijoy::DirectInput::new()?;
//! for joystick in di.devices().iter()? {
//!     let joystick = joystick?;
//!     println!("{}: {}", joystick.instance_name()?, joystick.state()?);
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! Each [`DirectInput::devices`] call hands out a fresh [`DeviceCollection`];
//! each [`DeviceCollection::iter`] call enumerates again. A running
//! [`DeviceEnumerator`] never sees hardware attached after it was created.

use crate::backends::InputApi;
use crate::config::AxisConfig;
use crate::error::Result;
use crate::guid::Guid;
use crate::joystick::Joystick;

/// Owner of the native subsystem handle.
#[derive(Clone)]
pub struct DirectInput<A: InputApi> {
    api: A,
    axis: AxisConfig,
}

#[cfg(windows)]
impl DirectInput<crate::backends::NativeApi> {
    /// Acquire the native DirectInput 8 subsystem.
    pub fn new() -> Result<Self> {
        Ok(Self::with_api(crate::backends::native_api()?))
    }
}

impl<A: InputApi> DirectInput<A> {
    /// Wrap an already created subsystem handle (takes over its reference).
    pub fn with_api(api: A) -> Self {
        Self {
            api,
            axis: AxisConfig::default(),
        }
    }

    /// Axis range/deadzone applied by every joystick opened from here on.
    pub fn with_axis_config(mut self, axis: AxisConfig) -> Self {
        self.axis = axis;
        self
    }

    #[inline]
    pub fn axis_config(&self) -> &AxisConfig {
        &self.axis
    }

    #[inline]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// A new collection over currently attached game controllers.
    pub fn devices(&self) -> DeviceCollection<A> {
        DeviceCollection {
            api: self.api.clone(),
            axis: self.axis,
        }
    }

    /// Open one controller directly by instance GUID.
    pub fn open(&self, instance: Guid) -> Result<Joystick<A>> {
        Joystick::open(&self.api, instance, &self.axis)
    }
}

/// Lazily enumerated set of attached game controllers.
pub struct DeviceCollection<A: InputApi> {
    api: A,
    axis: AxisConfig,
}

impl<A: InputApi> DeviceCollection<A> {
    /// Enumerate now and return a cursor over the result.
    pub fn iter(&self) -> Result<DeviceEnumerator<A>> {
        let ids = self.api.enum_game_controllers()?;
        log::debug!("enumerated {} game controller(s)", ids.len());
        Ok(DeviceEnumerator {
            api: self.api.clone(),
            axis: self.axis,
            ids,
            next: 0,
        })
    }
}

/// Forward-only cursor over the identifiers captured at enumeration time.
///
/// Each step opens the next device; a device that fails to open yields `Err`
/// and the cursor moves on.
pub struct DeviceEnumerator<A: InputApi> {
    api: A,
    axis: AxisConfig,
    ids: Vec<Guid>,
    next: usize,
}

impl<A: InputApi> DeviceEnumerator<A> {
    /// Rewind to before the first identifier. Does not re-enumerate.
    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Instance GUIDs captured at enumeration, in order.
    #[inline]
    pub fn identifiers(&self) -> &[Guid] {
        &self.ids
    }
}

impl<A: InputApi> Iterator for DeviceEnumerator<A> {
    type Item = Result<Joystick<A>>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = *self.ids.get(self.next)?;
        self.next += 1;
        Some(Joystick::open(&self.api, id, &self.axis))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.ids.len() - self.next;
        (left, Some(left))
    }
}

impl<A: InputApi> ExactSizeIterator for DeviceEnumerator<A> {}
