//! Probe call result types

use serde::Serialize;
use std::time::Duration;

use crate::plans::Endpoint;

/// What a single probe call produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum CallStatus {
    /// The service answered, with any status
    Response { status: u16, body: String },
    /// No response was obtained (connection refused, timeout, ...)
    Transport { error: String },
}

impl CallStatus {
    /// True only for a 2xx response
    pub fn is_success(&self) -> bool {
        matches!(self, CallStatus::Response { status, .. } if (200..300).contains(status))
    }

    /// HTTP status code, if a response was obtained
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CallStatus::Response { status, .. } => Some(*status),
            CallStatus::Transport { .. } => None,
        }
    }

    pub fn transport(error: impl Into<String>) -> Self {
        CallStatus::Transport {
            error: error.into(),
        }
    }
}

/// Outcome of one iteration of a plan
///
/// Produced, logged, and dropped by the worker.
#[derive(Debug, Clone, Serialize)]
pub struct CallOutcome {
    pub endpoint: Endpoint,
    /// Zero-based iteration index within the plan
    pub iteration: u32,
    pub latency: Duration,
    pub status: CallStatus,
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
