//! In-memory DirectInput stand-in.
//!
//! [`VirtualInput`] behaves like an `IDirectInput8W` whose attached devices are
//! [`VirtualController`]s you script from the host: attach/detach hardware,
//! set raw state, press buttons, and inject `Poll`/`Acquire` failures. It also
//! records what a joystick configured on open (data format, axis mode, ranges,
//! deadzones) and how many live references each object has, so reference
//! counting can be checked without COM.
//!
//! Single-threaded like an STA COM object: handles are `!Send`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::backends::InputApi;
use crate::device::{
    didft_make_instance, AxisMode, DeviceApi, DeviceInstance, DeviceObject, RawJoyState,
    DIDFT_ABSAXIS, DIDFT_POV, DIDFT_PSHBUTTON, MAX_BUTTONS, MAX_POVS, MAX_SLIDERS,
};
use crate::error::{Error, HResult, Result};
use crate::guid::{
    Guid, GUID_BUTTON, GUID_POV, GUID_RX_AXIS, GUID_RY_AXIS, GUID_RZ_AXIS, GUID_SLIDER,
    GUID_X_AXIS, GUID_Y_AXIS, GUID_Z_AXIS,
};
use crate::metadata::{DI8DEVTYPE_FLIGHT, DI8DEVTYPE_GAMEPAD};

const AXES: [(Guid, &str); 6] = [
    (GUID_X_AXIS, "X Axis"),
    (GUID_Y_AXIS, "Y Axis"),
    (GUID_Z_AXIS, "Z Axis"),
    (GUID_RX_AXIS, "X Rotation"),
    (GUID_RY_AXIS, "Y Rotation"),
    (GUID_RZ_AXIS, "Z Rotation"),
];

/// Description of a scripted controller.
#[derive(Clone, Debug)]
pub struct VirtualController {
    pub instance_name: String,
    pub product_name: String,
    pub product: Guid,
    pub dev_type: u32,
    pub objects: Vec<DeviceObject>,
    pub state: RawJoyState,
}

impl VirtualController {
    /// A controller with no objects.
    pub fn new(name: &str) -> Self {
        Self {
            instance_name: name.to_string(),
            product_name: name.to_string(),
            product: Guid::NIL,
            dev_type: DI8DEVTYPE_GAMEPAD as u32,
            objects: Vec::new(),
            state: RawJoyState::default(),
        }
    }

    /// Xbox-style layout: 6 axes, 10 buttons, 1 POV.
    pub fn gamepad(name: &str) -> Self {
        Self::new(name).with_axes(6).with_buttons(10).with_povs(1)
    }

    /// Stick + throttle layout: 6 axes, 2 sliders, 2 POVs, 32 buttons.
    pub fn flight_stick(name: &str) -> Self {
        let mut c = Self::new(name)
            .with_axes(6)
            .with_sliders(2)
            .with_povs(2)
            .with_buttons(32);
        c.dev_type = DI8DEVTYPE_FLIGHT as u32;
        c
    }

    pub fn with_product_name(mut self, name: &str) -> Self {
        self.product_name = name.to_string();
        self
    }

    pub fn with_product(mut self, product: Guid) -> Self {
        self.product = product;
        self
    }

    /// Add up to six of X, Y, Z, Rx, Ry, Rz (in that order).
    pub fn with_axes(mut self, n: usize) -> Self {
        for (guid, name) in AXES.iter().take(n) {
            let idx = self.next_instance();
            self.objects.push(DeviceObject {
                guid_type: *guid,
                obj_type: DIDFT_ABSAXIS | didft_make_instance(idx),
                name: name.to_string(),
            });
        }
        self
    }

    /// Sliders are axis objects with the slider type GUID.
    pub fn with_sliders(mut self, n: usize) -> Self {
        for i in 0..n {
            let idx = self.next_instance();
            self.objects.push(DeviceObject {
                guid_type: GUID_SLIDER,
                obj_type: DIDFT_ABSAXIS | didft_make_instance(idx),
                name: format!("Slider {i}"),
            });
        }
        self
    }

    pub fn with_povs(mut self, n: usize) -> Self {
        for i in 0..n {
            self.objects.push(DeviceObject {
                guid_type: GUID_POV,
                obj_type: DIDFT_POV | didft_make_instance(i as u16),
                name: format!("Hat Switch {i}"),
            });
        }
        self
    }

    pub fn with_buttons(mut self, n: usize) -> Self {
        for i in 0..n {
            self.objects.push(DeviceObject {
                guid_type: GUID_BUTTON,
                obj_type: DIDFT_PSHBUTTON | didft_make_instance(i as u16),
                name: format!("Button {i}"),
            });
        }
        self
    }

    pub fn with_object(mut self, obj: DeviceObject) -> Self {
        self.objects.push(obj);
        self
    }

    fn next_instance(&self) -> u16 {
        self.objects.iter().filter(|o| o.is_axis()).count() as u16
    }
}

/// What the host can observe about one virtual device.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceProbe {
    pub attached: bool,
    pub acquired: bool,
    pub format_set: bool,
    pub axis_mode: Option<AxisMode>,
    /// Object id -> (min, max) from `DIPROP_RANGE`.
    pub ranges: BTreeMap<u32, (i32, i32)>,
    /// Object id -> value from `DIPROP_DEADZONE`.
    pub deadzones: BTreeMap<u32, u32>,
    pub polls: usize,
    pub acquires: usize,
    /// Live [`VirtualDevice`] handles.
    pub refs: usize,
}

struct Slot {
    instance: Guid,
    ctl: VirtualController,
    probe: DeviceProbe,
    poll_failures: usize,
    acquire_failures: usize,
}

#[derive(Default)]
struct Registry {
    slots: Vec<Slot>,
    api_refs: usize,
    enum_failure: Option<HResult>,
    serial: u32,
}

impl Registry {
    fn slot(&mut self, id: &Guid) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.instance == *id)
    }
}

/// The virtual subsystem. Cloning adds a reference; dropping releases it.
pub struct VirtualInput {
    reg: Rc<RefCell<Registry>>,
}

impl VirtualInput {
    pub fn new() -> Self {
        let reg = Registry {
            api_refs: 1,
            ..Registry::default()
        };
        Self {
            reg: Rc::new(RefCell::new(reg)),
        }
    }

    /// Plug in a controller; returns its instance GUID.
    pub fn attach(&self, ctl: VirtualController) -> Guid {
        let mut reg = self.reg.borrow_mut();
        reg.serial += 1;
        // Same shape DirectInput uses for instance GUIDs.
        let instance = Guid::from_fields(
            0x6f1d_2b60 + reg.serial,
            0xd5a0,
            0x11cf,
            [0xbf, 0xc7, 0x44, 0x45, 0x53, 0x54, 0x00, 0x00],
        );
        reg.slots.push(Slot {
            instance,
            ctl,
            probe: DeviceProbe {
                attached: true,
                ..DeviceProbe::default()
            },
            poll_failures: 0,
            acquire_failures: 0,
        });
        instance
    }

    /// Unplug. Open handles stay valid but lose acquisition.
    pub fn detach(&self, id: &Guid) -> bool {
        self.with_slot(id, |s| {
            s.probe.attached = false;
            s.probe.acquired = false;
        })
        .is_some()
    }

    pub fn reattach(&self, id: &Guid) -> bool {
        self.with_slot(id, |s| s.probe.attached = true).is_some()
    }

    /// Simulate another application taking focus: acquisition is lost.
    pub fn unacquire(&self, id: &Guid) {
        self.with_slot(id, |s| s.probe.acquired = false);
    }

    /// The next `n` polls fail with `DIERR_INPUTLOST` (and drop acquisition).
    pub fn fail_polls(&self, id: &Guid, n: usize) {
        self.with_slot(id, |s| s.poll_failures = n);
    }

    /// The next `n` acquires fail with `DIERR_OTHERAPPHASPRIO`.
    pub fn fail_acquires(&self, id: &Guid, n: usize) {
        self.with_slot(id, |s| s.acquire_failures = n);
    }

    /// Make `EnumDevices` fail with `code` (or succeed again with `None`).
    pub fn fail_enumeration(&self, code: Option<HResult>) {
        self.reg.borrow_mut().enum_failure = code;
    }

    pub fn set_state(&self, id: &Guid, raw: RawJoyState) {
        self.with_slot(id, |s| s.ctl.state = raw);
    }

    pub fn update_state(&self, id: &Guid, f: impl FnOnce(&mut RawJoyState)) {
        self.with_slot(id, |s| f(&mut s.ctl.state));
    }

    /// Axis by index in `[X, Y, Z, Rx, Ry, Rz]` order.
    pub fn set_axis(&self, id: &Guid, axis: usize, value: i32) {
        self.update_state(id, |st| match axis {
            0 => st.x = value,
            1 => st.y = value,
            2 => st.z = value,
            3 => st.rx = value,
            4 => st.ry = value,
            5 => st.rz = value,
            _ => {}
        });
    }

    pub fn set_slider(&self, id: &Guid, slider: usize, value: i32) {
        if slider < MAX_SLIDERS {
            self.update_state(id, |st| st.sliders[slider] = value);
        }
    }

    pub fn set_pov(&self, id: &Guid, pov: usize, value: u32) {
        if pov < MAX_POVS {
            self.update_state(id, |st| st.povs[pov] = value);
        }
    }

    pub fn press_button(&self, id: &Guid, button: usize) {
        if button < MAX_BUTTONS {
            self.update_state(id, |st| st.buttons[button] = 0x80);
        }
    }

    pub fn release_button(&self, id: &Guid, button: usize) {
        if button < MAX_BUTTONS {
            self.update_state(id, |st| st.buttons[button] = 0);
        }
    }

    /// Live references to the subsystem (this handle included).
    pub fn api_refs(&self) -> usize {
        self.reg.borrow().api_refs
    }

    pub fn probe(&self, id: &Guid) -> Option<DeviceProbe> {
        self.reg.borrow_mut().slot(id).map(|s| s.probe.clone())
    }

    fn with_slot<R>(&self, id: &Guid, f: impl FnOnce(&mut Slot) -> R) -> Option<R> {
        self.reg.borrow_mut().slot(id).map(f)
    }
}

impl Default for VirtualInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for VirtualInput {
    fn clone(&self) -> Self {
        self.reg.borrow_mut().api_refs += 1;
        Self {
            reg: Rc::clone(&self.reg),
        }
    }
}

impl Drop for VirtualInput {
    fn drop(&mut self) {
        let mut reg = self.reg.borrow_mut();
        reg.api_refs = reg.api_refs.saturating_sub(1);
    }
}

impl InputApi for VirtualInput {
    type Device = VirtualDevice;

    fn enum_game_controllers(&self) -> Result<Vec<Guid>> {
        let reg = self.reg.borrow();
        if let Some(code) = reg.enum_failure {
            code.check("EnumDevices")?;
        }
        Ok(reg
            .slots
            .iter()
            .filter(|s| s.probe.attached)
            .map(|s| s.instance)
            .collect())
    }

    fn create_device(&self, instance: &Guid) -> Result<VirtualDevice> {
        let mut reg = self.reg.borrow_mut();
        match reg.slot(instance) {
            Some(s) if s.probe.attached => s.probe.refs += 1,
            _ => {
                return Err(Error::Native {
                    call: "CreateDevice",
                    code: HResult::DIERR_DEVICENOTREG,
                })
            }
        }
        Ok(VirtualDevice {
            reg: Rc::clone(&self.reg),
            instance: *instance,
        })
    }
}

/// Device handle created by [`VirtualInput`]; one reference per handle.
pub struct VirtualDevice {
    reg: Rc<RefCell<Registry>>,
    instance: Guid,
}

impl VirtualDevice {
    fn slot<R>(&self, call: &'static str, f: impl FnOnce(&mut Slot) -> Result<R>) -> Result<R> {
        let mut reg = self.reg.borrow_mut();
        match reg.slot(&self.instance) {
            Some(s) => f(s),
            None => Err(Error::Native {
                call,
                code: HResult::DIERR_DEVICENOTREG,
            }),
        }
    }

    fn require_object(s: &Slot, obj_type: u32, call: &'static str) -> Result<()> {
        if s.ctl.objects.iter().any(|o| o.obj_type == obj_type) {
            Ok(())
        } else {
            HResult::DIERR_OBJECTNOTFOUND.check(call)
        }
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if let Some(s) = self.reg.borrow_mut().slot(&self.instance) {
            s.probe.refs = s.probe.refs.saturating_sub(1);
        }
    }
}

impl DeviceApi for VirtualDevice {
    fn set_joystick_format(&self) -> Result<()> {
        self.slot("SetDataFormat", |s| {
            s.probe.format_set = true;
            Ok(())
        })
    }

    fn set_axis_mode(&self, mode: AxisMode) -> Result<()> {
        self.slot("SetProperty", |s| {
            s.probe.axis_mode = Some(mode);
            Ok(())
        })
    }

    fn objects(&self) -> Result<Vec<DeviceObject>> {
        self.slot("EnumObjects", |s| Ok(s.ctl.objects.clone()))
    }

    fn set_range(&self, obj_type: u32, min: i32, max: i32) -> Result<()> {
        self.slot("SetProperty", |s| {
            Self::require_object(s, obj_type, "SetProperty")?;
            if min >= max {
                return HResult::DIERR_INVALIDPARAM.check("SetProperty");
            }
            s.probe.ranges.insert(obj_type, (min, max));
            Ok(())
        })
    }

    fn set_deadzone(&self, obj_type: u32, deadzone: u32) -> Result<()> {
        self.slot("SetProperty", |s| {
            Self::require_object(s, obj_type, "SetProperty")?;
            if deadzone > 10_000 {
                return HResult::DIERR_INVALIDPARAM.check("SetProperty");
            }
            s.probe.deadzones.insert(obj_type, deadzone);
            Ok(())
        })
    }

    fn acquire(&self) -> Result<()> {
        self.slot("Acquire", |s| {
            s.probe.acquires += 1;
            if !s.probe.attached {
                return HResult::DIERR_UNPLUGGED.check("Acquire");
            }
            if s.acquire_failures > 0 {
                s.acquire_failures -= 1;
                return HResult::DIERR_OTHERAPPHASPRIO.check("Acquire");
            }
            s.probe.acquired = true;
            Ok(())
        })
    }

    fn poll(&self) -> Result<()> {
        self.slot("Poll", |s| {
            s.probe.polls += 1;
            if !s.probe.acquired {
                return HResult::DIERR_NOTACQUIRED.check("Poll");
            }
            if s.poll_failures > 0 {
                s.poll_failures -= 1;
                s.probe.acquired = false;
                return HResult::DIERR_INPUTLOST.check("Poll");
            }
            Ok(())
        })
    }

    fn state(&self) -> Result<RawJoyState> {
        self.slot("GetDeviceState", |s| {
            if !s.probe.acquired {
                HResult::DIERR_NOTACQUIRED.check("GetDeviceState")?;
            }
            Ok(s.ctl.state)
        })
    }

    fn info(&self) -> Result<DeviceInstance> {
        self.slot("GetDeviceInfo", |s| {
            Ok(DeviceInstance {
                instance: s.instance,
                product: s.ctl.product,
                dev_type: s.ctl.dev_type,
                instance_name: s.ctl.instance_name.clone(),
                product_name: s.ctl.product_name.clone(),
                usage_page: 0x01,
                usage: 0x04,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_carry_expected_objects() {
        let pad = VirtualController::gamepad("Pad");
        assert_eq!(pad.objects.iter().filter(|o| o.is_axis()).count(), 6);
        assert_eq!(pad.objects.iter().filter(|o| o.is_button()).count(), 10);
        assert_eq!(pad.objects.iter().filter(|o| o.is_pov()).count(), 1);

        let stick = VirtualController::flight_stick("Stick");
        assert_eq!(stick.objects.iter().filter(|o| o.is_slider()).count(), 2);
        // Sliders are axes too and get distinct instance numbers.
        let axis_ids: std::collections::BTreeSet<u32> = stick
            .objects
            .iter()
            .filter(|o| o.is_axis())
            .map(|o| o.obj_type)
            .collect();
        assert_eq!(axis_ids.len(), 8);
    }

    #[test]
    fn enumeration_skips_detached_devices() {
        let api = VirtualInput::new();
        let a = api.attach(VirtualController::gamepad("A"));
        let b = api.attach(VirtualController::gamepad("B"));
        assert_ne!(a, b);
        api.detach(&a);
        assert_eq!(api.enum_game_controllers().unwrap(), vec![b]);
        api.reattach(&a);
        assert_eq!(api.enum_game_controllers().unwrap(), vec![a, b]);
    }

    #[test]
    fn device_handles_are_reference_counted() {
        let api = VirtualInput::new();
        let id = api.attach(VirtualController::gamepad("A"));
        let d1 = api.create_device(&id).unwrap();
        let d2 = api.create_device(&id).unwrap();
        assert_eq!(api.probe(&id).unwrap().refs, 2);
        drop(d1);
        assert_eq!(api.probe(&id).unwrap().refs, 1);
        drop(d2);
        assert_eq!(api.probe(&id).unwrap().refs, 0);

        let extra = api.clone();
        assert_eq!(api.api_refs(), 2);
        drop(extra);
        assert_eq!(api.api_refs(), 1);
    }

    #[test]
    fn unknown_device_is_not_registered() {
        let api = VirtualInput::new();
        let err = api.create_device(&Guid::from_u128(42)).err().expect("unregistered instance");
        assert_eq!(err.code(), Some(HResult::DIERR_DEVICENOTREG));
    }
}
