//! Traffic orchestration
//!
//! Waits out a fixed warmup, launches one probe worker per call plan on a
//! bounded pool, and waits for them up to a hard deadline.
//!
//! ## Timing
//!
//! - Warmup: 10s, before any call is made
//! - Pool: 4 concurrent workers
//! - Completion deadline: 5m after dispatch; outstanding workers are then
//!   abandoned, not killed

mod runner;
mod state;

pub use runner::{COMPLETION_DEADLINE, POOL_SIZE, RunSummary, TrafficOrchestrator, WARMUP};
pub use state::{RunState, RunStatus, RunTracker};
