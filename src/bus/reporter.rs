//! Reporting of failed event handlers

use std::any::Any;
use std::fmt;
use std::sync::Mutex;

use super::{EventEnvelope, HandlerError};

/// How a handler failed
#[derive(Debug)]
pub enum HandlerFailure {
    /// The handler returned an error
    Error(HandlerError),
    /// The handler panicked
    Panic(String),
}

impl HandlerFailure {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        HandlerFailure::Panic(message)
    }
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerFailure::Error(err) => write!(f, "handler error: {err}"),
            HandlerFailure::Panic(msg) => write!(f, "handler panicked: {msg}"),
        }
    }
}

/// Receives handler failures instead of the publisher
pub trait ErrorReporter: Send + Sync {
    fn report(&self, envelope: &EventEnvelope, failure: &HandlerFailure);
}

/// Default reporter: logs through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, envelope: &EventEnvelope, failure: &HandlerFailure) {
        tracing::error!(topic = %envelope.topic, "{failure}");
    }
}

/// Reporter that keeps every failure, for inspection
#[derive(Debug, Default)]
pub struct CollectingReporter {
    failures: Mutex<Vec<(String, String)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(topic, failure message)` pairs in report order
    pub fn failures(&self) -> Vec<(String, String)> {
        self.failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, envelope: &EventEnvelope, failure: &HandlerFailure) {
        self.failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((envelope.topic.clone(), failure.to_string()));
    }
}
