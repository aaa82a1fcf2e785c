//! Change notifications.
//!
//! The polling service turns each [`Substate`] bit set by
//! [`ControllerState::update`](crate::controller::ControllerState::update)
//! into one [`ControllerEvent`] carrying a copy of the group that moved.
//!
//! ## Value conventions
//! - **Axes / sliders:** configured logical range (default `[-1000, 1000]`).
//! - **Buttons:** `true` while held.
//! - **POV hats:** hundredths of a degree clockwise from north, `-1` = centered.

use std::time::SystemTime;

use crate::controller::{Axes, Buttons, ControllerIdentity, PovHats, Sliders, Substate};
use crate::guid::Guid;

/// What changed.
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    /// A different controller was selected.
    ControllerChanged(ControllerIdentity),
    AxesChanged(Axes),
    ButtonsChanged(Buttons),
    SlidersChanged(Sliders),
    PovHatsChanged(PovHats),
}

impl EventKind {
    /// The [`Substate`] bit this kind corresponds to.
    pub fn substate(&self) -> Substate {
        match self {
            EventKind::ControllerChanged(_) => Substate::CONTROLLER,
            EventKind::AxesChanged(_) => Substate::AXES,
            EventKind::ButtonsChanged(_) => Substate::BUTTONS,
            EventKind::SlidersChanged(_) => Substate::SLIDERS,
            EventKind::PovHatsChanged(_) => Substate::POV_HATS,
        }
    }
}

/// Timestamped change on one controller.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerEvent {
    pub at: SystemTime,
    /// Instance GUID of the controller the change came from.
    pub instance: Guid,
    pub kind: EventKind,
}
