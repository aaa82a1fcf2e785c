//! Polling service for one selected controller.
//!
//! [`ControllerService`] owns the subsystem, the selected [`Controller`], its
//! last [`ControllerState`] and an [`InputEventBus`]. Each [`poll`] reads the
//! device once, folds the reading into the state and emits one
//! [`ControllerEvent`] per group that changed, in the order axes, buttons,
//! POV hats, sliders.
//!
//! With no controller attached the service stays idle: polls return
//! [`Substate::NONE`] until [`change_controller`] succeeds.
//!
//! [`poll`]: ControllerService::poll
//! [`change_controller`]: ControllerService::change_controller

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::backends::InputApi;
use crate::config::Config;
use crate::controller::{self, Controller, ControllerIdentity, ControllerState, Substate};
use crate::error::{Error, Result};
use crate::event::{ControllerEvent, EventKind};
use crate::eventbus::InputEventBus;
use crate::input::DirectInput;

/// One row of [`ControllerService::controllers`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedController {
    #[serde(flatten)]
    pub identity: ControllerIdentity,
    /// `true` for the controller the service is reading from.
    pub current: bool,
}

pub struct ControllerService<A: InputApi> {
    input: DirectInput<A>,
    config: Config,
    controller: Option<Controller<A>>,
    state: ControllerState,
    bus: InputEventBus,
}

impl<A: InputApi> ControllerService<A> {
    /// Validate `config`, apply its axis settings to `input` and select the
    /// remembered controller (or the best available match).
    pub fn new(input: DirectInput<A>, config: Config) -> Result<Self> {
        config.validate()?;
        let input = input.with_axis_config(config.axis);
        let now = SystemTime::now();

        let wanted = config.controller.clone().unwrap_or_default();
        let controller = controller::find_instance(&input, &wanted)?
            .map(|(id, joystick)| Controller::new(id, joystick, now));
        if controller.is_none() {
            log::info!("no game controller attached, service idle");
        }

        Ok(Self {
            input,
            config,
            controller,
            state: ControllerState::new(now),
            bus: InputEventBus::new(),
        })
    }

    /// Read the current controller once and notify listeners.
    pub fn poll(&mut self, now: SystemTime) -> Result<Substate> {
        let Some(current) = &self.controller else {
            return Ok(Substate::NONE);
        };
        let reading = current.read()?;
        let instance = current.identity().instance;
        let updated = self.state.update(now, &reading);

        let mut events = Vec::new();
        let mut push = |kind: EventKind| {
            events.push(ControllerEvent {
                at: now,
                instance,
                kind,
            })
        };
        if updated.contains(Substate::AXES) {
            push(EventKind::AxesChanged(self.state.axes));
        }
        if updated.contains(Substate::BUTTONS) {
            push(EventKind::ButtonsChanged(self.state.buttons.clone()));
        }
        if updated.contains(Substate::POV_HATS) {
            push(EventKind::PovHatsChanged(self.state.pov_hats.clone()));
        }
        if updated.contains(Substate::SLIDERS) {
            push(EventKind::SlidersChanged(self.state.sliders.clone()));
        }
        self.bus.emit_all(&events);

        Ok(updated)
    }

    /// Poll every [`poll_interval`](Self::poll_interval) until `keep_going`
    /// returns `false`.
    ///
    /// A failed read is logged and handed to `keep_going`; polling carries on
    /// at the same interval unless it says otherwise.
    pub fn run(&mut self, mut keep_going: impl FnMut(Result<Substate>) -> bool) {
        loop {
            let polled = self.poll(SystemTime::now());
            if let Err(e) = &polled {
                log::warn!("poll failed: {e}");
            }
            if !keep_going(polled) {
                return;
            }
            std::thread::sleep(self.poll_interval());
        }
    }

    /// Switch to the best match for `wanted`.
    ///
    /// When nothing matches, the previous controller stays selected.
    pub fn change_controller(&mut self, wanted: &ControllerIdentity) -> Result<()> {
        let Some((id, joystick)) = controller::find_instance(&self.input, wanted)? else {
            return Err(Error::ControllerNotFound(format!(
                "\"{}\" ({})",
                wanted.instance_name, wanted.instance
            )));
        };

        let now = SystemTime::now();
        let event = ControllerEvent {
            at: now,
            instance: id.instance,
            kind: EventKind::ControllerChanged(id.clone()),
        };
        // Old handle is released here.
        self.controller = Some(Controller::new(id.clone(), joystick, now));
        self.config.controller = Some(id);
        self.bus.emit(&event);
        Ok(())
    }

    /// Attached controllers, flagging the one in use.
    pub fn controllers(&self) -> Result<Vec<AttachedController>> {
        let current = self.controller.as_ref().map(|c| c.identity().instance);
        Ok(controller::attached(&self.input)?
            .into_iter()
            .map(|identity| AttachedController {
                current: Some(identity.instance) == current,
                identity,
            })
            .collect())
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval()
    }

    #[inline]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Identity of the selected controller, `None` while idle.
    pub fn identity(&self) -> Option<&ControllerIdentity> {
        self.controller.as_ref().map(Controller::identity)
    }

    pub fn controller(&self) -> Option<&Controller<A>> {
        self.controller.as_ref()
    }

    /// Current configuration; `controller` follows the last successful change.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn bus_mut(&mut self) -> &mut InputEventBus {
        &mut self.bus
    }
}
