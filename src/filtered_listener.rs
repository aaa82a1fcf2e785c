use crate::event::ControllerEvent;
use crate::eventbus::InputListener;

/// Wraps a listener and filters events based on a user-supplied predicate.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&ControllerEvent) -> bool>,
    inner: Box<dyn InputListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&ControllerEvent) -> bool + 'static,
        inner: Box<dyn InputListener>,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner,
        }
    }
}

impl InputListener for FilteredListener {
    fn on_input(&mut self, event: &ControllerEvent) {
        if (self.predicate)(event) {
            self.inner.on_input(event);
        }
    }
}
