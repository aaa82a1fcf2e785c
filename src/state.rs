//! Polled joystick state.
//!
//! [`JoystickState`] is the owned transcription of one `DIJOYSTATE` read. The
//! variable-length groups are sized to what the device reported at open time,
//! capped at the native buffer's capacity.
//!
//! ## Value conventions
//! - Axes and sliders use the configured logical range (default `[-1000, 1000]`).
//! - POV hats are hundredths of degrees clockwise from north, `-1` when
//!   centered. [`pov_slot`] converts to the 8-way slot convention
//!   (`-1` neutral, `0..7` clockwise from up).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::{RawJoyState, MAX_BUTTONS, MAX_POVS, MAX_SLIDERS};
use crate::error::Result;

/// Object counts discovered during `EnumObjects` at open time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCounts {
    pub axes: usize,
    pub buttons: usize,
    pub pov_hats: usize,
    pub sliders: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoystickState {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub rx: i32,
    pub ry: i32,
    pub rz: i32,
    pub sliders: Vec<i32>,
    pub pov_hats: Vec<i32>,
    pub buttons: Vec<bool>,
}

impl JoystickState {
    /// Transcribe a raw buffer using the counts discovered at open time.
    pub fn from_raw(raw: &RawJoyState, counts: &ObjectCounts) -> Self {
        Self {
            x: raw.x,
            y: raw.y,
            z: raw.z,
            rx: raw.rx,
            ry: raw.ry,
            rz: raw.rz,
            sliders: raw.sliders[..counts.sliders.min(MAX_SLIDERS)].to_vec(),
            pov_hats: raw.povs[..counts.pov_hats.min(MAX_POVS)]
                .iter()
                .map(|&p| p as i32)
                .collect(),
            buttons: raw.buttons[..counts.buttons.min(MAX_BUTTONS)]
                .iter()
                .map(|&b| b != 0)
                .collect(),
        }
    }

    /// The six axes in `[X, Y, Z, Rx, Ry, Rz]` order.
    #[inline]
    pub fn axes(&self) -> [i32; 6] {
        [self.x, self.y, self.z, self.rx, self.ry, self.rz]
    }

    /// Indices of pressed buttons.
    pub fn pressed(&self) -> impl Iterator<Item = usize> + '_ {
        self.buttons
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for JoystickState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "X = {}, Y = {}, Z = {}", self.x, self.y, self.z)?;
        write!(f, "Rx = {}, Ry = {}, Rz = {}", self.rx, self.ry, self.rz)?;

        if !self.sliders.is_empty() {
            writeln!(f)?;
            for (i, v) in self.sliders.iter().enumerate() {
                write!(f, "S{i} = {v}, ")?;
            }
        }
        if !self.pov_hats.is_empty() {
            writeln!(f)?;
            for (i, v) in self.pov_hats.iter().enumerate() {
                write!(f, "P{i} = {v}, ")?;
            }
        }
        if !self.buttons.is_empty() {
            writeln!(f)?;
            for (i, v) in self.buttons.iter().enumerate() {
                write!(f, "B{i} = {v}, ")?;
            }
        }
        Ok(())
    }
}

/// Convert a POV reading to an 8-way slot.
///
/// Centered readings (negative, or the low word `0xFFFF` some drivers report)
/// map to `-1`. Otherwise `slot = floor((deg + 22.5) / 45) mod 8`.
pub fn pov_slot(value: i32) -> i16 {
    if value < 0 || value & 0xFFFF == 0xFFFF {
        return -1;
    }
    let hundredths = value % 36_000;
    (((hundredths + 2_250) / 4_500) % 8) as i16
}
