use crate::event::{ControllerEvent, EventKind};
use crate::eventbus::InputListener;

/// A listener that writes every event to the `log` facade at info level.
#[derive(Debug, Default)]
pub struct LogListener;

impl LogListener {
    pub fn new() -> Self {
        LogListener
    }
}

impl InputListener for LogListener {
    fn on_input(&mut self, event: &ControllerEvent) {
        match &event.kind {
            EventKind::ControllerChanged(id) => {
                log::info!("[{}] controller -> \"{}\"", event.instance, id.instance_name)
            }
            EventKind::AxesChanged(a) => log::info!(
                "[{}] axes x={} y={} z={} rx={} ry={} rz={}",
                event.instance,
                a.x,
                a.y,
                a.z,
                a.rx,
                a.ry,
                a.rz
            ),
            EventKind::ButtonsChanged(b) => {
                let held: Vec<usize> = b
                    .pressed
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &p)| p.then_some(i))
                    .collect();
                log::info!("[{}] buttons held {:?}", event.instance, held)
            }
            EventKind::SlidersChanged(s) => {
                log::info!("[{}] sliders {:?}", event.instance, s.position)
            }
            EventKind::PovHatsChanged(p) => {
                log::info!("[{}] pov {:?}", event.instance, p.direction)
            }
        }
    }
}
