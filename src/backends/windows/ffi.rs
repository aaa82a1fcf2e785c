#![cfg(target_os = "windows")]
#![allow(non_snake_case)]

//! COM vtables for the two DirectInput 8 interfaces this crate calls.
//!
//! `windows-sys` ships the flat functions, plain structs and constants of
//! `dinput.h` but not COM interfaces, so only the vtables are declared here.
//! Slots this crate never calls are typed as opaque pointers; their position
//! still matters, so do not remove them.

use core::ffi::c_void;

use windows_sys::core::{GUID, HRESULT};
use windows_sys::Win32::Devices::HumanInterfaceDevice::{
    DIDATAFORMAT, DIDEVICEINSTANCEW, DIDOI_ASPECTPOSITION, DIJOYSTATE, DIOBJECTDATAFORMAT,
    DIPROPHEADER, GUID_POV, GUID_RxAxis, GUID_RyAxis, GUID_RzAxis, GUID_Slider, GUID_XAxis,
    GUID_YAxis, GUID_ZAxis, LPDIENUMDEVICEOBJECTSCALLBACKW, LPDIENUMDEVICESCALLBACKW,
};

use crate::device::{
    DIDFT_ANYINSTANCE, DIDFT_AXIS, DIDFT_BUTTON, DIDFT_OPTIONAL, DIDFT_POV, MAX_BUTTONS, MAX_POVS,
};
use crate::guid::Guid;

/// `MAKEDIPROP(n)`: property "GUIDs" are small integers cast to pointers.
///
/// `windows-sys` exports `DIPROP_*` as `GUID` values, which DirectInput
/// would dereference, so the pointers are built here instead.
#[inline]
pub fn make_diprop(n: usize) -> *const GUID {
    n as *const GUID
}

pub fn diprop_axismode() -> *const GUID {
    make_diprop(2)
}

pub fn diprop_range() -> *const GUID {
    make_diprop(4)
}

pub fn diprop_deadzone() -> *const GUID {
    make_diprop(5)
}

pub const fn to_native(g: &Guid) -> GUID {
    GUID {
        data1: g.data1,
        data2: g.data2,
        data3: g.data3,
        data4: g.data4,
    }
}

pub const fn from_native(g: &GUID) -> Guid {
    Guid::from_fields(g.data1, g.data2, g.data3, g.data4)
}

/// Read a NUL-terminated UTF-16 buffer.
pub fn wide_to_string(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

#[repr(C)]
pub struct IUnknownVtbl {
    pub QueryInterface:
        unsafe extern "system" fn(*mut c_void, *const GUID, *mut *mut c_void) -> HRESULT,
    pub AddRef: unsafe extern "system" fn(*mut c_void) -> u32,
    pub Release: unsafe extern "system" fn(*mut c_void) -> u32,
}

#[repr(C)]
pub struct IDirectInput8WVtbl {
    pub base: IUnknownVtbl,
    pub CreateDevice: unsafe extern "system" fn(
        *mut IDirectInput8W,
        *const GUID,
        *mut *mut IDirectInputDevice8W,
        *mut c_void,
    ) -> HRESULT,
    pub EnumDevices: unsafe extern "system" fn(
        *mut IDirectInput8W,
        u32,
        LPDIENUMDEVICESCALLBACKW,
        *mut c_void,
        u32,
    ) -> HRESULT,
    pub GetDeviceStatus: *const c_void,
    pub RunControlPanel: *const c_void,
    pub Initialize: *const c_void,
    pub FindDevice: *const c_void,
    pub EnumDevicesBySemantics: *const c_void,
    pub ConfigureDevices: *const c_void,
}

#[repr(C)]
pub struct IDirectInput8W {
    pub lpVtbl: *const IDirectInput8WVtbl,
}

#[repr(C)]
pub struct IDirectInputDevice8WVtbl {
    pub base: IUnknownVtbl,
    pub GetCapabilities: *const c_void,
    pub EnumObjects: unsafe extern "system" fn(
        *mut IDirectInputDevice8W,
        LPDIENUMDEVICEOBJECTSCALLBACKW,
        *mut c_void,
        u32,
    ) -> HRESULT,
    pub GetProperty: *const c_void,
    pub SetProperty: unsafe extern "system" fn(
        *mut IDirectInputDevice8W,
        *const GUID,
        *const DIPROPHEADER,
    ) -> HRESULT,
    pub Acquire: unsafe extern "system" fn(*mut IDirectInputDevice8W) -> HRESULT,
    pub Unacquire: unsafe extern "system" fn(*mut IDirectInputDevice8W) -> HRESULT,
    pub GetDeviceState:
        unsafe extern "system" fn(*mut IDirectInputDevice8W, u32, *mut c_void) -> HRESULT,
    pub GetDeviceData: *const c_void,
    pub SetDataFormat:
        unsafe extern "system" fn(*mut IDirectInputDevice8W, *const DIDATAFORMAT) -> HRESULT,
    pub SetEventNotification: *const c_void,
    pub SetCooperativeLevel: *const c_void,
    pub GetObjectInfo: *const c_void,
    pub GetDeviceInfo:
        unsafe extern "system" fn(*mut IDirectInputDevice8W, *mut DIDEVICEINSTANCEW) -> HRESULT,
    pub RunControlPanel: *const c_void,
    pub Initialize: *const c_void,
    pub CreateEffect: *const c_void,
    pub EnumEffects: *const c_void,
    pub GetEffectInfo: *const c_void,
    pub GetForceFeedbackState: *const c_void,
    pub SendForceFeedbackCommand: *const c_void,
    pub EnumCreatedEffectObjects: *const c_void,
    pub Escape: *const c_void,
    pub Poll: unsafe extern "system" fn(*mut IDirectInputDevice8W) -> HRESULT,
}

#[repr(C)]
pub struct IDirectInputDevice8W {
    pub lpVtbl: *const IDirectInputDevice8WVtbl,
}

// Statics so the pointers stored in `DIOBJECTDATAFORMAT` stay valid for the
// whole program.
static XAXIS: GUID = GUID_XAxis;
static YAXIS: GUID = GUID_YAxis;
static ZAXIS: GUID = GUID_ZAxis;
static RXAXIS: GUID = GUID_RxAxis;
static RYAXIS: GUID = GUID_RyAxis;
static RZAXIS: GUID = GUID_RzAxis;
static SLIDER: GUID = GUID_Slider;
static POV: GUID = GUID_POV;

/// Object table equivalent to `c_dfDIJoystick` (dinput8.lib).
///
/// 6 axes, 2 sliders, 4 POVs and 32 buttons, every entry optional so devices
/// with fewer objects still accept the format.
pub fn joystick_objects() -> Vec<DIOBJECTDATAFORMAT> {
    let axis_type = DIDFT_OPTIONAL | DIDFT_AXIS | DIDFT_ANYINSTANCE;
    let pov_type = DIDFT_OPTIONAL | DIDFT_POV | DIDFT_ANYINSTANCE;
    let button_type = DIDFT_OPTIONAL | DIDFT_BUTTON | DIDFT_ANYINSTANCE;

    let axes: [*const GUID; 8] = [
        &XAXIS,
        &YAXIS,
        &ZAXIS,
        &RXAXIS,
        &RYAXIS,
        &RZAXIS,
        &SLIDER,
        &SLIDER,
    ];

    let mut out = Vec::with_capacity(axes.len() + MAX_POVS + MAX_BUTTONS);
    let mut ofs = 0u32;
    for pguid in axes {
        out.push(DIOBJECTDATAFORMAT {
            pguid,
            dwOfs: ofs,
            dwType: axis_type,
            dwFlags: DIDOI_ASPECTPOSITION,
        });
        ofs += 4;
    }
    for _ in 0..MAX_POVS {
        out.push(DIOBJECTDATAFORMAT {
            pguid: &POV,
            dwOfs: ofs,
            dwType: pov_type,
            dwFlags: 0,
        });
        ofs += 4;
    }
    for _ in 0..MAX_BUTTONS {
        out.push(DIOBJECTDATAFORMAT {
            pguid: core::ptr::null(),
            dwOfs: ofs,
            dwType: button_type,
            dwFlags: 0,
        });
        ofs += 1;
    }
    debug_assert_eq!(ofs as usize, core::mem::size_of::<DIJOYSTATE>());
    out
}
