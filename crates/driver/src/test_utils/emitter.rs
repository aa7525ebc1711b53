//! An [Emitter] that records events.

use crate::{Emitter, Event};
use spin::Mutex;
use std::sync::Arc;

/// An [Emitter] that records every emitted event. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct TestEmitter {
    events: Arc<Mutex<Vec<Event>>>,
}

impl TestEmitter {
    /// Returns the recorded events and clears the record.
    pub fn take(&self) -> Vec<Event> {
        core::mem::take(&mut *self.events.lock())
    }

    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }
}

impl Emitter for TestEmitter {
    fn emit(&self, event: Event) {
        self.events.lock().push(event);
    }
}
