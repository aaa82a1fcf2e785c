use std::collections::HashMap;

use crate::controller::Substate;
use crate::event::ControllerEvent;
use crate::guid::Guid;

/// Trait for reacting to controller change events.
pub trait InputListener {
    fn on_input(&mut self, event: &ControllerEvent);
}

/// Determines which kinds of events a listener wants to receive.
#[derive(Debug, Clone, Copy)]
pub enum EventFilter {
    All,
    /// Only events whose group is in the set.
    Only(Substate),
    Custom(fn(&ControllerEvent) -> bool),
}

impl EventFilter {
    fn passes(&self, event: &ControllerEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Only(groups) => groups.intersects(event.kind.substate()),
            EventFilter::Custom(f) => f(event),
        }
    }
}

/// Metadata-wrapped listener with filters and control flags.
struct ListenerEntry {
    listener: Box<dyn InputListener>,
    enabled: bool,
    filter: EventFilter,
    tag: Option<Guid>, // only events from this instance
}

#[derive(Default)]
pub struct InputEventBus {
    next_id: u64,
    listeners: HashMap<u64, ListenerEntry>,
}

impl InputEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener with optional filtering and instance tag.
    pub fn add_listener(
        &mut self,
        listener: impl InputListener + 'static,
        filter: EventFilter,
        tag: Option<Guid>,
    ) -> u64 {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
                tag,
            },
        );
        self.next_id += 1;
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Disables (mutes) a listener without removing it.
    pub fn disable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    /// Unregisters a listener entirely.
    pub fn remove_listener(&mut self, id: u64) {
        self.listeners.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Emits one event to all active and matching listeners.
    pub fn emit(&mut self, event: &ControllerEvent) {
        for entry in self.listeners.values_mut() {
            if !entry.enabled {
                continue;
            }

            if let Some(wanted) = entry.tag {
                if event.instance != wanted {
                    continue;
                }
            }

            if entry.filter.passes(event) {
                entry.listener.on_input(event);
            }
        }
    }

    /// Emits a batch of events to matching listeners.
    pub fn emit_all(&mut self, events: &[ControllerEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}
