//! Probe client
//!
//! Typed client for calling the simulated endpoint service, plus the
//! [`Probe`] trait workers call through.

mod probe;
mod types;

pub use probe::{Probe, ProbeClient, ProbeError, ProbeResult, REQUEST_TIMEOUT};
pub use types::{CallOutcome, CallStatus};
