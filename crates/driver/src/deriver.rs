//! The [Deriver] trait and the [DeriverMux] dispatching events to derivers.

use crate::Event;
use async_trait::async_trait;
use core::fmt::Debug;

/// A component reacting to [Event]s.
#[async_trait]
pub trait Deriver: Debug + Send {
    /// Processes the event to completion.
    ///
    /// Returns true if the event was consumed. A deriver that only observes an event other
    /// components also react to returns false, so that dispatch continues.
    async fn on_event(&mut self, event: &Event) -> bool;
}

/// Offers each event to its derivers in registration order, stopping at the first one that
/// consumes it.
#[derive(Debug, Default)]
pub struct DeriverMux {
    derivers: Vec<Box<dyn Deriver>>,
}

impl DeriverMux {
    /// Creates an empty mux.
    pub const fn new() -> Self {
        Self { derivers: Vec::new() }
    }

    /// Registers a deriver after every deriver registered so far.
    pub fn with(mut self, deriver: impl Deriver + 'static) -> Self {
        self.push(Box::new(deriver));
        self
    }

    /// Registers a boxed deriver after every deriver registered so far.
    pub fn push(&mut self, deriver: Box<dyn Deriver>) {
        self.derivers.push(deriver);
    }

    /// Returns the number of registered derivers.
    pub fn len(&self) -> usize {
        self.derivers.len()
    }

    /// Returns true if no deriver is registered.
    pub fn is_empty(&self) -> bool {
        self.derivers.is_empty()
    }
}

#[async_trait]
impl Deriver for DeriverMux {
    async fn on_event(&mut self, event: &Event) -> bool {
        for deriver in self.derivers.iter_mut() {
            if deriver.on_event(event).await {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spin::Mutex;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Recording {
        name: &'static str,
        handles: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Deriver for Recording {
        async fn on_event(&mut self, event: &Event) -> bool {
            self.seen.lock().push(self.name);
            event.name() == self.handles
        }
    }

    fn mux(seen: &Arc<Mutex<Vec<&'static str>>>) -> DeriverMux {
        DeriverMux::new()
            .with(Recording { name: "a", handles: "try-finalize", seen: seen.clone() })
            .with(Recording { name: "b", handles: "try-update-engine", seen: seen.clone() })
            .with(Recording { name: "c", handles: "try-update-engine", seen: seen.clone() })
    }

    #[tokio::test]
    async fn test_mux_stops_at_first_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut mux = mux(&seen);
        assert!(mux.on_event(&Event::TryUpdateEngine).await);
        assert_eq!(*seen.lock(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_mux_unhandled_visits_all() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut mux = mux(&seen);
        assert_eq!(mux.len(), 3);
        assert!(!mux.on_event(&Event::ResetEngineRequest).await);
        assert_eq!(*seen.lock(), vec!["a", "b", "c"]);
    }
}
