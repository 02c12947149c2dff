//! Detection of the URI-too-long failure mode
//!
//! Every load-more click appends pagination parameters to the request URL.
//! Past a length limit some servers answer with a "414 Request-URI Too Long"
//! page embedded in an otherwise ordinary response, so the body text is the
//! only reliable signal.

use crate::harvest::page::{ResponseEvent, ResponseStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::error::TryRecvError;

/// Body text that marks a rejected load-more request
pub const URI_TOO_LONG_SIGNATURE: &str = "414 Request-URI Too Long";

/// Returns true if a response body carries the URI-too-long signature
pub fn is_uri_too_long(body: &str) -> bool {
    body.contains(URI_TOO_LONG_SIGNATURE)
}

/// Monotonic terminal-error flag shared by the monitor and the controller
///
/// Once raised it stays raised for the lifetime of the traversal.
#[derive(Debug, Clone, Default)]
pub struct ErrorSignal(Arc<AtomicBool>);

impl ErrorSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Watches background responses and raises an `ErrorSignal`
///
/// Events queue up in the response stream while the controller is busy; they
/// are only inspected when `poll` is called, which the controller does at the
/// start of every expand iteration.
pub struct NetworkErrorMonitor {
    events: ResponseStream,
    signal: ErrorSignal,
    observed: usize,
    closed: bool,
}

impl NetworkErrorMonitor {
    pub fn new(events: ResponseStream, signal: ErrorSignal) -> Self {
        Self {
            events,
            signal,
            observed: 0,
            closed: false,
        }
    }

    /// Inspects one response, raising the signal on a match
    ///
    /// Returns true if this response matched.
    pub fn observe(&mut self, event: &ResponseEvent) -> bool {
        self.observed += 1;

        if !event.resource.is_background() {
            return false;
        }

        tracing::trace!("Background response: {}", event.url);

        if is_uri_too_long(&event.body) {
            tracing::debug!("Detected 414 Request-URI Too Long from {}", event.url);
            self.signal.raise();
            return true;
        }

        false
    }

    /// Drains every queued response and reports whether the signal is raised
    pub fn poll(&mut self) -> bool {
        while !self.closed {
            match self.events.try_recv() {
                Ok(event) => {
                    self.observe(&event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::debug!("Response stream closed after {} events", self.observed);
                    self.closed = true;
                }
            }
        }

        self.signal.is_raised()
    }

    /// Number of responses inspected so far
    pub fn observed(&self) -> usize {
        self.observed
    }

    pub fn signal(&self) -> &ErrorSignal {
        &self.signal
    }
}
