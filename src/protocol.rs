use serde::{Deserialize, Serialize};

use crate::backend::RequestError;

/// Body of `POST /generate_mermaid`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramRequest {
    pub text: String,
}

impl DiagramRequest {
    /// Build a request from raw input. Returns `None` for whitespace-only text.
    pub fn from_input(input: &str) -> Option<Self> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
        })
    }
}

/// Successful response body. `mermaid` must be present and a string.
#[derive(Debug, Deserialize)]
pub struct DiagramResponse {
    pub mermaid: String,
}

/// Error body the backend sends with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// The detail as display text, if it is a non-empty string.
    pub fn message(&self) -> Option<String> {
        self.detail
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Events delivered from background tasks to the app loop.
#[derive(Debug)]
pub enum BackendEvent {
    /// A request settled, either way.
    Settled {
        request_id: u64,
        outcome: Result<String, RequestError>,
    },
}
