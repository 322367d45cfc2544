//! Lifecycle of the single diagram request.
//!
//! At most one request is in flight. `submit` refuses new work while one is
//! pending; the background task reports back through a [`SettleGuard`], which
//! always produces exactly one settlement even if the task dies.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::backend::{DiagramBackend, RequestError};
use crate::protocol::{BackendEvent, DiagramRequest};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded(String),
    Failed(String),
}

/// An accepted submission, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: u64,
    pub request: DiagramRequest,
}

#[derive(Debug, Default)]
pub struct RequestLifecycle {
    state: RequestState,
    next_id: u64,
    in_flight: Option<u64>,
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Markup of the last successful request, if the current state holds one.
    pub fn markup(&self) -> Option<&str> {
        match &self.state {
            RequestState::Succeeded(markup) => Some(markup),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RequestState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Accept `text` for generation. Returns `None` (and changes nothing) when
    /// the text is blank or a request is already pending.
    pub fn submit(&mut self, text: &str) -> Option<Submission> {
        if self.is_pending() {
            debug!("submit ignored, request already pending");
            return None;
        }
        let request = DiagramRequest::from_input(text)?;

        self.next_id += 1;
        let id = self.next_id;
        self.in_flight = Some(id);
        self.state = RequestState::Pending;
        info!(request_id = id, chars = request.text.len(), "diagram request submitted");

        Some(Submission { id, request })
    }

    /// Apply the outcome of request `request_id`. Settlements for anything
    /// other than the in-flight request are dropped. Returns whether the
    /// state changed.
    pub fn settle(&mut self, request_id: u64, outcome: Result<String, RequestError>) -> bool {
        if self.in_flight != Some(request_id) {
            debug!(request_id, "ignoring stale settlement");
            return false;
        }
        self.in_flight = None;

        self.state = match outcome {
            Ok(markup) => {
                info!(request_id, chars = markup.len(), "diagram received");
                RequestState::Succeeded(markup)
            }
            Err(e) => {
                warn!(request_id, error = %e, "diagram request failed");
                RequestState::Failed(e.to_string())
            }
        };
        true
    }
}

/// Delivers exactly one settlement for a request. Dropping it without
/// calling [`SettleGuard::complete`] reports [`RequestError::Aborted`].
pub struct SettleGuard {
    request_id: u64,
    tx: Option<mpsc::UnboundedSender<BackendEvent>>,
}

impl SettleGuard {
    pub fn new(request_id: u64, tx: mpsc::UnboundedSender<BackendEvent>) -> Self {
        Self {
            request_id,
            tx: Some(tx),
        }
    }

    pub fn complete(mut self, outcome: Result<String, RequestError>) {
        self.send(outcome);
    }

    fn send(&mut self, outcome: Result<String, RequestError>) {
        if let Some(tx) = self.tx.take() {
            let event = BackendEvent::Settled {
                request_id: self.request_id,
                outcome,
            };
            if tx.send(event).is_err() {
                debug!(request_id = self.request_id, "app loop gone, settlement dropped");
            }
        }
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        self.send(Err(RequestError::Aborted));
    }
}

/// Run `submission` against `backend` on a background task.
pub fn dispatch(
    backend: Arc<dyn DiagramBackend>,
    submission: Submission,
    tx: mpsc::UnboundedSender<BackendEvent>,
) {
    tokio::spawn(async move {
        let guard = SettleGuard::new(submission.id, tx);
        let outcome = backend.generate(&submission.request).await;
        guard.complete(outcome);
    });
}
