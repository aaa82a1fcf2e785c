#![cfg(target_os = "windows")]

//! COM DirectInput 8 backend.
//!
//! [`DInput8`] wraps `IDirectInput8W`; [`DInputDevice`] wraps
//! `IDirectInputDevice8W`. Each owns one reference through [`ComPtr`]. Every
//! `HRESULT` goes through [`HResult::check`], so a failing call surfaces as
//! [`Error::Native`](crate::error::Error::Native) naming the method.

use core::ffi::c_void;
use core::mem::size_of;
use core::ptr::null_mut;

use windows_sys::core::GUID;
use windows_sys::Win32::Devices::HumanInterfaceDevice::{
    DirectInput8Create, DI8DEVCLASS_GAMECTRL, DIDATAFORMAT, DIDEVICEINSTANCEW,
    DIDEVICEOBJECTINSTANCEW, DIDF_ABSAXIS, DIEDFL_ATTACHEDONLY, DIENUM_CONTINUE, DIJOYSTATE,
    DIOBJECTDATAFORMAT, DIPH_BYID, DIPH_DEVICE, DIPROPDWORD, DIPROPHEADER, DIPROPRANGE,
    DIRECTINPUT_VERSION,
};
use windows_sys::Win32::Foundation::BOOL;
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;

use super::com::{ComPtr, Interface};
use super::ffi::*;
use crate::backends::InputApi;
use crate::device::{AxisMode, DeviceApi, DeviceInstance, DeviceObject, RawJoyState, DIDFT_ALL};
use crate::error::{Error, HResult, Result};
use crate::guid::{Guid, IID_IDIRECTINPUT8W};

unsafe impl Interface for IDirectInput8W {
    type Vtbl = IDirectInput8WVtbl;
}

unsafe impl Interface for IDirectInputDevice8W {
    type Vtbl = IDirectInputDevice8WVtbl;
}

fn null_out(call: &'static str) -> Error {
    Error::Native {
        call,
        code: HResult::E_POINTER,
    }
}

/// `IDirectInput8W` handle. `Clone` is `AddRef`.
#[derive(Clone)]
pub struct DInput8 {
    inner: ComPtr<IDirectInput8W>,
}

impl DInput8 {
    /// `DirectInput8Create` for the current module.
    pub fn create() -> Result<Self> {
        let iid = to_native(&IID_IDIRECTINPUT8W);
        let mut out: *mut c_void = null_mut();

        // SAFETY: plain FFI call; `out` receives an owned reference on success.
        let hr = unsafe {
            let hinst = GetModuleHandleW(core::ptr::null());
            DirectInput8Create(hinst, DIRECTINPUT_VERSION, &iid, &mut out, null_mut())
        };
        HResult(hr).check("DirectInput8Create")?;

        // SAFETY: on success `out` is an `IDirectInput8W*` we now own.
        let inner = unsafe { ComPtr::from_raw(out as *mut IDirectInput8W) }
            .ok_or_else(|| null_out("DirectInput8Create"))?;

        log::debug!("DirectInput8 0x{DIRECTINPUT_VERSION:04x} created");
        Ok(Self { inner })
    }
}

unsafe extern "system" fn collect_instance(
    ddi: *mut DIDEVICEINSTANCEW,
    ctx: *mut c_void,
) -> BOOL {
    // SAFETY: DirectInput passes a valid instance for the duration of the
    // callback; `ctx` is the `Vec<Guid>` handed to `EnumDevices` below.
    if let (Some(ddi), Some(out)) = (ddi.as_ref(), (ctx as *mut Vec<Guid>).as_mut()) {
        out.push(from_native(&ddi.guidInstance));
    }
    DIENUM_CONTINUE as BOOL
}

impl InputApi for DInput8 {
    type Device = DInputDevice;

    fn enum_game_controllers(&self) -> Result<Vec<Guid>> {
        let mut ids: Vec<Guid> = Vec::new();
        // SAFETY: `ids` outlives the synchronous enumeration.
        let hr = unsafe {
            (self.inner.vtbl().EnumDevices)(
                self.inner.as_ptr(),
                DI8DEVCLASS_GAMECTRL,
                Some(collect_instance),
                &mut ids as *mut Vec<Guid> as *mut c_void,
                DIEDFL_ATTACHEDONLY,
            )
        };
        HResult(hr).check("EnumDevices")?;
        Ok(ids)
    }

    fn create_device(&self, instance: &Guid) -> Result<DInputDevice> {
        let guid = to_native(instance);
        let mut raw: *mut IDirectInputDevice8W = null_mut();
        // SAFETY: `raw` receives an owned reference on success.
        let hr = unsafe {
            (self.inner.vtbl().CreateDevice)(self.inner.as_ptr(), &guid, &mut raw, null_mut())
        };
        HResult(hr).check("CreateDevice")?;

        // SAFETY: on success `raw` is an `IDirectInputDevice8W*` we now own.
        let inner = unsafe { ComPtr::from_raw(raw) }.ok_or_else(|| null_out("CreateDevice"))?;
        Ok(DInputDevice { inner })
    }
}

/// `IDirectInputDevice8W` handle.
pub struct DInputDevice {
    inner: ComPtr<IDirectInputDevice8W>,
}

unsafe extern "system" fn collect_object(
    ddoi: *mut DIDEVICEOBJECTINSTANCEW,
    ctx: *mut c_void,
) -> BOOL {
    // SAFETY: as in `collect_instance`; `ctx` is a `Vec<DeviceObject>`.
    if let (Some(o), Some(out)) = (ddoi.as_ref(), (ctx as *mut Vec<DeviceObject>).as_mut()) {
        out.push(DeviceObject {
            guid_type: from_native(&o.guidType),
            obj_type: o.dwType,
            name: wide_to_string(&o.tszName),
        });
    }
    DIENUM_CONTINUE as BOOL
}

/// Header pointer whose provenance covers the whole property struct.
fn property_header<P>(value: &P) -> *const DIPROPHEADER {
    value as *const P as *const DIPROPHEADER
}

impl DInputDevice {
    /// `SetProperty` with a whole `DIPROP*` struct; DirectInput reads
    /// `diph.dwSize` bytes starting at `value`.
    fn set_property<P>(&self, prop: *const GUID, value: &P) -> Result<()> {
        let header = property_header(value);
        // SAFETY: `P` is a `#[repr(C)]` property struct starting with a
        // `DIPROPHEADER` whose `dwSize` is `size_of::<P>()`.
        let hr = unsafe { (self.inner.vtbl().SetProperty)(self.inner.as_ptr(), prop, header) };
        HResult(hr).check("SetProperty")
    }

    fn dword_property(obj: u32, how: u32, data: u32) -> DIPROPDWORD {
        DIPROPDWORD {
            diph: DIPROPHEADER {
                dwSize: size_of::<DIPROPDWORD>() as u32,
                dwHeaderSize: size_of::<DIPROPHEADER>() as u32,
                dwObj: obj,
                dwHow: how,
            },
            dwData: data,
        }
    }
}

impl DeviceApi for DInputDevice {
    fn set_joystick_format(&self) -> Result<()> {
        let mut objects = joystick_objects();
        let format = DIDATAFORMAT {
            dwSize: size_of::<DIDATAFORMAT>() as u32,
            dwObjSize: size_of::<DIOBJECTDATAFORMAT>() as u32,
            dwFlags: DIDF_ABSAXIS,
            dwDataSize: size_of::<DIJOYSTATE>() as u32,
            dwNumObjs: objects.len() as u32,
            rgodf: objects.as_mut_ptr(),
        };
        // SAFETY: DirectInput copies the format; `objects` lives across the call.
        let hr = unsafe { (self.inner.vtbl().SetDataFormat)(self.inner.as_ptr(), &format) };
        HResult(hr).check("SetDataFormat")
    }

    fn set_axis_mode(&self, mode: AxisMode) -> Result<()> {
        let prop = Self::dword_property(0, DIPH_DEVICE, mode.raw());
        self.set_property(diprop_axismode(), &prop)
    }

    fn objects(&self) -> Result<Vec<DeviceObject>> {
        let mut out: Vec<DeviceObject> = Vec::new();
        // SAFETY: `out` outlives the synchronous enumeration.
        let hr = unsafe {
            (self.inner.vtbl().EnumObjects)(
                self.inner.as_ptr(),
                Some(collect_object),
                &mut out as *mut Vec<DeviceObject> as *mut c_void,
                DIDFT_ALL,
            )
        };
        HResult(hr).check("EnumObjects")?;
        Ok(out)
    }

    fn set_range(&self, obj_type: u32, min: i32, max: i32) -> Result<()> {
        let prop = DIPROPRANGE {
            diph: DIPROPHEADER {
                dwSize: size_of::<DIPROPRANGE>() as u32,
                dwHeaderSize: size_of::<DIPROPHEADER>() as u32,
                dwObj: obj_type,
                dwHow: DIPH_BYID,
            },
            lMin: min,
            lMax: max,
        };
        self.set_property(diprop_range(), &prop)
    }

    fn set_deadzone(&self, obj_type: u32, deadzone: u32) -> Result<()> {
        let prop = Self::dword_property(obj_type, DIPH_BYID, deadzone);
        self.set_property(diprop_deadzone(), &prop)
    }

    fn acquire(&self) -> Result<()> {
        // SAFETY: no arguments beyond `this`.
        let hr = unsafe { (self.inner.vtbl().Acquire)(self.inner.as_ptr()) };
        HResult(hr).check("Acquire")
    }

    fn poll(&self) -> Result<()> {
        // SAFETY: no arguments beyond `this`. DI_NOEFFECT (1) counts as success.
        let hr = unsafe { (self.inner.vtbl().Poll)(self.inner.as_ptr()) };
        HResult(hr).check("Poll")
    }

    fn state(&self) -> Result<RawJoyState> {
        // SAFETY: DIJOYSTATE is plain integers; all-zero is a valid value.
        let mut st: DIJOYSTATE = unsafe { core::mem::zeroed() };
        // SAFETY: the buffer size matches the data format set at open.
        let hr = unsafe {
            (self.inner.vtbl().GetDeviceState)(
                self.inner.as_ptr(),
                size_of::<DIJOYSTATE>() as u32,
                &mut st as *mut DIJOYSTATE as *mut c_void,
            )
        };
        HResult(hr).check("GetDeviceState")?;

        Ok(RawJoyState {
            x: st.lX,
            y: st.lY,
            z: st.lZ,
            rx: st.lRx,
            ry: st.lRy,
            rz: st.lRz,
            sliders: st.rglSlider,
            povs: st.rgdwPOV,
            buttons: st.rgbButtons,
        })
    }

    fn info(&self) -> Result<DeviceInstance> {
        // SAFETY: plain data; `dwSize` is set before the call as required.
        let mut info: DIDEVICEINSTANCEW = unsafe { core::mem::zeroed() };
        info.dwSize = size_of::<DIDEVICEINSTANCEW>() as u32;
        // SAFETY: `info` is writable and sized as announced in `dwSize`.
        let hr = unsafe { (self.inner.vtbl().GetDeviceInfo)(self.inner.as_ptr(), &mut info) };
        HResult(hr).check("GetDeviceInfo")?;

        Ok(DeviceInstance {
            instance: from_native(&info.guidInstance),
            product: from_native(&info.guidProduct),
            dev_type: info.dwDevType,
            instance_name: wide_to_string(&info.tszInstanceName),
            product_name: wide_to_string(&info.tszProductName),
            usage_page: info.wUsagePage,
            usage: info.wUsage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_structs_announce_their_full_size() {
        let range = DIPROPRANGE {
            diph: DIPROPHEADER {
                dwSize: size_of::<DIPROPRANGE>() as u32,
                dwHeaderSize: size_of::<DIPROPHEADER>() as u32,
                dwObj: 0,
                dwHow: DIPH_BYID,
            },
            lMin: -1000,
            lMax: 1000,
        };
        let header = property_header(&range);
        assert_eq!(header as usize, &range as *const DIPROPRANGE as usize);
        // SAFETY: `header` points at `range.diph`.
        assert_eq!(unsafe { (*header).dwSize }, 24);

        let deadzone = DInputDevice::dword_property(7, DIPH_BYID, 1000);
        let header = property_header(&deadzone);
        // SAFETY: as above.
        let (size, obj) = unsafe { ((*header).dwSize, (*header).dwObj) };
        assert_eq!(size as usize, size_of::<DIPROPDWORD>());
        assert_eq!(obj, 7);
    }
}
