//! Per-device handle.
//!
//! [`Joystick`] owns one device reference plus its own reference to the
//! subsystem that created it. Opening configures the device once:
//!
//! 1. joystick data format (`c_dfDIJoystick`),
//! 2. absolute axis mode,
//! 3. for every axis object: logical range and deadzone from [`AxisConfig`],
//! 4. button / POV / slider counting in the same object pass,
//! 5. an initial acquire.
//!
//! State reads poll, re-acquire once on failure, and give up after one retry.

use crate::backends::InputApi;
use crate::config::AxisConfig;
use crate::device::{AxisMode, DeviceApi, DeviceInstance};
use crate::error::Result;
use crate::guid::Guid;
use crate::metadata::DeviceMeta;
use crate::state::{JoystickState, ObjectCounts};

pub struct Joystick<A: InputApi> {
    // Fields drop in declaration order: the device is released before the subsystem.
    device: A::Device,
    _api: A,
    counts: ObjectCounts,
}

impl<A: InputApi> Joystick<A> {
    /// Create, configure and acquire the device identified by `instance`.
    pub fn open(api: &A, instance: Guid, axis: &AxisConfig) -> Result<Self> {
        let device = api.create_device(&instance)?;
        device.set_joystick_format()?;
        device.set_axis_mode(AxisMode::Absolute)?;

        let mut counts = ObjectCounts::default();
        for obj in device.objects()? {
            if obj.is_axis() {
                counts.axes += 1;
                if let Err(e) = device.set_range(obj.obj_type, axis.min, axis.max) {
                    log::warn!("{instance}: range on {:?} ({:#x}): {e}", obj.name, obj.obj_type);
                }
                if let Err(e) = device.set_deadzone(obj.obj_type, axis.deadzone) {
                    log::warn!("{instance}: deadzone on {:?} ({:#x}): {e}", obj.name, obj.obj_type);
                }
            }
            if obj.is_button() {
                counts.buttons += 1;
            }
            if obj.is_pov() {
                counts.pov_hats += 1;
            }
            if obj.is_slider() {
                counts.sliders += 1;
            }
        }

        if let Err(e) = device.acquire() {
            log::debug!("{instance}: initial acquire failed, deferring to first read: {e}");
        }

        log::debug!(
            "opened {instance}: axes={} buttons={} povs={} sliders={}",
            counts.axes,
            counts.buttons,
            counts.pov_hats,
            counts.sliders
        );

        Ok(Self {
            device,
            _api: api.clone(),
            counts,
        })
    }

    /// Poll and read the current state.
    ///
    /// A failed poll triggers one `Acquire` and one more poll; if either fails
    /// the error is returned.
    pub fn state(&self) -> Result<JoystickState> {
        if let Err(e) = self.device.poll() {
            log::warn!("poll failed ({e}), re-acquiring");
            self.device.acquire()?;
            self.device.poll()?;
        }
        let raw = self.device.state()?;
        Ok(JoystickState::from_raw(&raw, &self.counts))
    }

    /// Object counts discovered when the device was opened.
    #[inline]
    pub fn counts(&self) -> ObjectCounts {
        self.counts
    }

    pub fn instance_name(&self) -> Result<String> {
        Ok(self.device.info()?.instance_name)
    }

    pub fn product_name(&self) -> Result<String> {
        Ok(self.device.info()?.product_name)
    }

    pub fn instance(&self) -> Result<Guid> {
        Ok(self.device.info()?.instance)
    }

    pub fn product(&self) -> Result<Guid> {
        Ok(self.device.info()?.product)
    }

    /// Full `GetDeviceInfo` record.
    pub fn info(&self) -> Result<DeviceInstance> {
        self.device.info()
    }

    pub fn metadata(&self) -> Result<DeviceMeta> {
        Ok(DeviceMeta::from_instance(&self.device.info()?))
    }
}

impl<A: InputApi> std::fmt::Debug for Joystick<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Joystick")
            .field("instance", &self.instance().ok())
            .field("counts", &self.counts)
            .finish()
    }
}
