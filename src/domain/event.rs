use crate::domain::envelope::{Envelope, Params};
use serde_json::{Value, json};

/// Lifecycle notifications emitted by the provider at fixed points of a call.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    MethodCalled {
        operation: &'a str,
        params: &'a Params,
    },
    PayStarted {
        plugins: &'a [String],
        params: &'a Params,
    },
    ApiRequesting(&'a Envelope),
    ApiRequested(&'a Envelope),
    PayFinished(&'a Envelope),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    MethodCalled,
    PayStarted,
    ApiRequesting,
    ApiRequested,
    PayFinished,
}

impl Event<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::MethodCalled { .. } => EventKind::MethodCalled,
            Event::PayStarted { .. } => EventKind::PayStarted,
            Event::ApiRequesting(_) => EventKind::ApiRequesting,
            Event::ApiRequested(_) => EventKind::ApiRequested,
            Event::PayFinished(_) => EventKind::PayFinished,
        }
    }

    /// Owned snapshot, for sinks that outlive the call.
    pub fn to_value(&self) -> Value {
        match self {
            Event::MethodCalled { operation, params } => {
                json!({ "operation": operation, "params": params })
            }
            Event::PayStarted { plugins, params } => {
                json!({ "plugins": plugins, "params": params })
            }
            Event::ApiRequesting(envelope)
            | Event::ApiRequested(envelope)
            | Event::PayFinished(envelope) => envelope.to_diagnostic(),
        }
    }
}
