//! Controller identity, discovery and tracked state.
//!
//! A [`ControllerIdentity`] is what gets remembered between runs (see
//! [`Config::controller`](crate::config::Config)). Instance GUIDs are stable
//! for a given port on a given machine, but not across machines, so
//! [`find_instance`] falls back through progressively looser matches:
//!
//! 1. same instance GUID
//! 2. same product GUID
//! 3. same instance name
//! 4. same product name
//! 5. any attached controller
//!
//! [`ControllerState`] keeps the last reading split into groups and reports
//! which groups moved on each update as a [`Substate`] set.

use std::time::SystemTime;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::backends::InputApi;
use crate::device::DeviceInstance;
use crate::error::Result;
use crate::guid::Guid;
use crate::input::DirectInput;
use crate::joystick::Joystick;
use crate::state::JoystickState;

/// The four strings DirectInput reports about a controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerIdentity {
    pub instance: Guid,
    pub product: Guid,
    pub instance_name: String,
    pub product_name: String,
}

impl ControllerIdentity {
    /// Identity of an open joystick (one `GetDeviceInfo` call).
    pub fn of<A: InputApi>(joystick: &Joystick<A>) -> Result<Self> {
        Ok(Self::from(&joystick.info()?))
    }

    fn matches(&self, pass: usize, other: &ControllerIdentity) -> bool {
        match pass {
            0 => self.instance == other.instance,
            1 => self.product == other.product,
            2 => self.instance_name == other.instance_name,
            3 => self.product_name == other.product_name,
            _ => true,
        }
    }
}

impl From<&DeviceInstance> for ControllerIdentity {
    fn from(info: &DeviceInstance) -> Self {
        Self {
            instance: info.instance,
            product: info.product,
            instance_name: info.instance_name.clone(),
            product_name: info.product_name.clone(),
        }
    }
}

const MATCH_PASSES: usize = 5;

/// Identities of every attached game controller, in enumeration order.
///
/// Devices that fail to open are skipped.
pub fn attached<A: InputApi>(di: &DirectInput<A>) -> Result<Vec<ControllerIdentity>> {
    let mut out = Vec::new();
    for joystick in di.devices().iter()? {
        match joystick.and_then(|j| ControllerIdentity::of(&j)) {
            Ok(id) => out.push(id),
            Err(e) => log::warn!("skipping controller: {e}"),
        }
    }
    Ok(out)
}

/// Best attached match for `wanted`, already opened.
///
/// Returns `Ok(None)` when nothing is attached (or nothing could be opened).
pub fn find_instance<A: InputApi>(
    di: &DirectInput<A>,
    wanted: &ControllerIdentity,
) -> Result<Option<(ControllerIdentity, Joystick<A>)>> {
    let mut devices = di.devices().iter()?;

    for pass in 0..MATCH_PASSES {
        devices.reset();
        for joystick in devices.by_ref() {
            let joystick = match joystick {
                Ok(j) => j,
                Err(e) => {
                    log::warn!("find_instance: skipping controller: {e}");
                    continue;
                }
            };
            let id = match ControllerIdentity::of(&joystick) {
                Ok(id) => id,
                Err(e) => {
                    log::warn!("find_instance: no device info: {e}");
                    continue;
                }
            };
            if wanted.matches(pass, &id) {
                log::info!(
                    "selected \"{}\" ({}) on pass {}",
                    id.instance_name,
                    id.instance,
                    pass + 1
                );
                return Ok(Some((id, joystick)));
            }
        }
    }

    Ok(None)
}

/// A selected controller: its identity plus the open handle.
pub struct Controller<A: InputApi> {
    identity: ControllerIdentity,
    joystick: Joystick<A>,
    selected_at: SystemTime,
}

impl<A: InputApi> Controller<A> {
    pub fn new(identity: ControllerIdentity, joystick: Joystick<A>, at: SystemTime) -> Self {
        Self {
            identity,
            joystick,
            selected_at: at,
        }
    }

    #[inline]
    pub fn identity(&self) -> &ControllerIdentity {
        &self.identity
    }

    #[inline]
    pub fn joystick(&self) -> &Joystick<A> {
        &self.joystick
    }

    #[inline]
    pub fn selected_at(&self) -> SystemTime {
        self.selected_at
    }

    pub fn read(&self) -> Result<JoystickState> {
        self.joystick.state()
    }
}

bitflags! {
    /// Groups of [`ControllerState`] that changed in one update.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Substate: u32 {
        const CONTROLLER = 0x01;
        const AXES = 0x02;
        const BUTTONS = 0x04;
        const SLIDERS = 0x08;
        const POV_HATS = 0x10;
    }
}

impl Substate {
    pub const NONE: Substate = Substate::empty();
}

/// The six absolute axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axes {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub rx: i32,
    pub ry: i32,
    pub rz: i32,
    pub at: SystemTime,
}

impl Axes {
    fn new(at: SystemTime) -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            rx: 0,
            ry: 0,
            rz: 0,
            at,
        }
    }

    fn update(&mut self, at: SystemTime, state: &JoystickState) -> Substate {
        let next = state.axes();
        if [self.x, self.y, self.z, self.rx, self.ry, self.rz] == next {
            return Substate::NONE;
        }
        [self.x, self.y, self.z, self.rx, self.ry, self.rz] = next;
        self.at = at;
        Substate::AXES
    }
}

// Replaced wholesale on a length change, element-wise otherwise.
fn update_list<T: Copy + PartialEq>(current: &mut Vec<T>, next: &[T]) -> bool {
    if current.len() != next.len() {
        *current = next.to_vec();
        return true;
    }
    let mut changed = false;
    for (slot, &value) in current.iter_mut().zip(next) {
        if *slot != value {
            *slot = value;
            changed = true;
        }
    }
    changed
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buttons {
    pub pressed: Vec<bool>,
    pub at: SystemTime,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sliders {
    pub position: Vec<i32>,
    pub at: SystemTime,
}

/// POV directions in hundredths of a degree, `-1` when centered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PovHats {
    pub direction: Vec<i32>,
    pub at: SystemTime,
}

/// Last known state of the selected controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub at: SystemTime,
    pub axes: Axes,
    pub buttons: Buttons,
    pub sliders: Sliders,
    pub pov_hats: PovHats,
}

impl ControllerState {
    pub fn new(at: SystemTime) -> Self {
        Self {
            at,
            axes: Axes::new(at),
            buttons: Buttons {
                pressed: Vec::new(),
                at,
            },
            sliders: Sliders {
                position: Vec::new(),
                at,
            },
            pov_hats: PovHats {
                direction: Vec::new(),
                at,
            },
        }
    }

    /// Fold a new reading in. Group timestamps only move for groups that
    /// changed; the overall timestamp always moves.
    pub fn update(&mut self, at: SystemTime, state: &JoystickState) -> Substate {
        self.at = at;

        let mut updated = self.axes.update(at, state);
        if update_list(&mut self.buttons.pressed, &state.buttons) {
            self.buttons.at = at;
            updated |= Substate::BUTTONS;
        }
        if update_list(&mut self.sliders.position, &state.sliders) {
            self.sliders.at = at;
            updated |= Substate::SLIDERS;
        }
        if update_list(&mut self.pov_hats.direction, &state.pov_hats) {
            self.pov_hats.at = at;
            updated |= Substate::POV_HATS;
        }
        updated
    }
}
