//! Observer that keeps every call event for assertions

use std::sync::Mutex;
use trust_client::{CallEvent, CallObserver};

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CallEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CallEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.count(|e| matches!(e, CallEvent::Attempt { .. }))
    }

    pub fn retries(&self) -> usize {
        self.count(|e| matches!(e, CallEvent::Retry { .. }))
    }

    pub fn count(&self, predicate: impl Fn(&CallEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }
}

impl CallObserver for RecordingObserver {
    fn on_event(&self, event: &CallEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
