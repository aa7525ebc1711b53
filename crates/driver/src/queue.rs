//! The bounded FIFO queue the driver drains.

use crate::{Emitter, Event};
use spin::Mutex;
use std::{collections::VecDeque, sync::Arc};

/// A bounded FIFO of [Event]s, shared between the driver and every [Emitter] handle.
///
/// Emitting into a full queue drops the event and marks the queue as overflowed. The driver
/// checks the flag after every dispatch and stops.
#[derive(Debug, Clone)]
pub struct EventQueue {
    inner: Arc<Mutex<QueueState>>,
}

#[derive(Debug)]
struct QueueState {
    events: VecDeque<Event>,
    limit: usize,
    overflowed: bool,
}

impl EventQueue {
    /// Creates a new queue holding at most `limit` events.
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueState {
                events: VecDeque::new(),
                limit,
                overflowed: false,
            })),
        }
    }

    /// Pops the oldest event.
    pub fn pop(&self) -> Option<Event> {
        self.inner.lock().events.pop_front()
    }

    /// Returns the number of queued events.
    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    /// Returns true if no events are queued.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().events.is_empty()
    }

    /// Returns the maximum number of queued events.
    pub fn limit(&self) -> usize {
        self.inner.lock().limit
    }

    /// Returns true if an event was dropped because the queue was full.
    pub fn overflowed(&self) -> bool {
        self.inner.lock().overflowed
    }

    /// Drops every queued event and clears the overflow flag.
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.events.clear();
        state.overflowed = false;
    }
}

impl Emitter for EventQueue {
    fn emit(&self, event: Event) {
        let mut state = self.inner.lock();
        if state.events.len() >= state.limit {
            if !state.overflowed {
                error!(
                    target: "driver",
                    limit = state.limit,
                    event = event.name(),
                    "Event queue is full, dropping event"
                );
            }
            state.overflowed = true;
            return;
        }
        state.events.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_fifo() {
        let queue = EventQueue::new(4);
        queue.emit(Event::TryFinalize);
        queue.emit(Event::TryUpdateEngine);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(Event::TryFinalize));
        assert_eq!(queue.pop(), Some(Event::TryUpdateEngine));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_overflow_drops_and_flags() {
        let queue = EventQueue::new(2);
        let handle = queue.clone();
        handle.emit(Event::TryFinalize);
        handle.emit(Event::TryFinalize);
        assert!(!queue.overflowed());

        handle.emit(Event::TryUpdateEngine);
        assert!(queue.overflowed());
        assert_eq!(queue.len(), 2);
        assert!(!queue.inner.lock().events.contains(&Event::TryUpdateEngine));

        queue.clear();
        assert!(!queue.overflowed());
        assert!(queue.is_empty());
    }
}
