use crate::domain::event::{Event, EventKind};
use crate::domain::ports::{EventSink, Transport};
use crate::domain::radar::{Radar, Response};
use crate::error::TransportError;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

/// A scripted transport.
///
/// Answers each request with the next queued outcome and remembers every
/// radar it was given. Ideal for tests and offline runs where no gateway is
/// reachable.
#[derive(Default)]
pub struct InMemoryTransport {
    outcomes: Mutex<VecDeque<Result<Response, String>>>,
    requests: Mutex<Vec<Radar>>,
}

impl InMemoryTransport {
    /// Creates a transport with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: Response) {
        self.outcomes.lock().push_back(Ok(response));
    }

    /// Queues a transport-level failure carrying `message`.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.outcomes.lock().push_back(Err(message.into()));
    }

    pub fn requests(&self) -> Vec<Radar> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Transport for InMemoryTransport {
    fn send(&self, radar: &Radar) -> Result<Response, TransportError> {
        self.requests.lock().push(radar.clone());
        match self.outcomes.lock().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Connection(message)),
            None => Err(TransportError::Connection(format!(
                "no response scripted for {} {}",
                radar.method, radar.url
            ))),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn dispatch(&self, _event: &Event<'_>) {}
}

/// Keeps a snapshot of every event it receives.
#[derive(Default)]
pub struct InMemoryEventSink {
    events: Mutex<Vec<(EventKind, Value)>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(|(kind, _)| *kind).collect()
    }

    pub fn snapshots(&self) -> Vec<(EventKind, Value)> {
        self.events.lock().clone()
    }
}

impl EventSink for InMemoryEventSink {
    fn dispatch(&self, event: &Event<'_>) {
        self.events.lock().push((event.kind(), event.to_value()));
    }
}
