//! Run state management
//!
//! Shared view of where a traffic run is in its lifecycle.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Lifecycle of a traffic run
///
/// Variants are declared in lifecycle order; a run only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    /// Holding off while the service finishes starting
    Warmup,
    /// Launching workers
    Dispatching,
    /// Waiting for workers, bounded by the completion deadline
    AwaitingCompletion,
    /// Every worker finished before the deadline
    Completed,
    /// The deadline passed with workers still outstanding
    TimedOut,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::TimedOut)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::NotStarted => write!(f, "not_started"),
            RunState::Warmup => write!(f, "warmup"),
            RunState::Dispatching => write!(f, "dispatching"),
            RunState::AwaitingCompletion => write!(f, "awaiting_completion"),
            RunState::Completed => write!(f, "completed"),
            RunState::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// Internal mutable state
#[derive(Debug)]
struct InnerState {
    state: RunState,
    created_at: Instant,
    entered: Vec<(RunState, Instant)>,
    workers_total: usize,
    workers_finished: usize,
}

/// Shared run tracker
///
/// Cheap to clone; all clones observe the same run.
#[derive(Debug, Clone)]
pub struct RunTracker {
    inner: Arc<RwLock<InnerState>>,
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RunTracker {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            inner: Arc::new(RwLock::new(InnerState {
                state: RunState::NotStarted,
                created_at: now,
                entered: vec![(RunState::NotStarted, now)],
                workers_total: 0,
                workers_finished: 0,
            })),
        }
    }

    /// Move to `next`
    ///
    /// Returns false, leaving the state unchanged, if `next` is not ahead of
    /// the current state or the run already reached a terminal state.
    pub fn advance(&self, next: RunState) -> bool {
        let mut state = self.inner.write();
        let current = state.state;

        if current.is_terminal() || next <= current {
            warn!(from = %current, to = %next, "Ignoring run state transition");
            return false;
        }

        let now = Instant::now();
        state.state = next;
        state.entered.push((next, now));
        info!(
            from = %current,
            to = %next,
            elapsed_ms = now.duration_since(state.created_at).as_millis() as u64,
            "Run state changed"
        );
        true
    }

    /// Current state
    pub fn state(&self) -> RunState {
        self.inner.read().state
    }

    /// Time between tracker creation and entering `state`, if it was entered
    pub fn entered_after(&self, state: RunState) -> Option<Duration> {
        let inner = self.inner.read();
        inner
            .entered
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, at)| at.duration_since(inner.created_at))
    }

    /// States visited so far, in order
    pub fn history(&self) -> Vec<RunState> {
        self.inner.read().entered.iter().map(|(s, _)| *s).collect()
    }

    pub fn set_workers_total(&self, total: usize) {
        self.inner.write().workers_total = total;
    }

    pub fn worker_finished(&self) {
        self.inner.write().workers_finished += 1;
    }

    /// Snapshot for logging or reporting
    pub fn status(&self) -> RunStatus {
        let inner = self.inner.read();
        RunStatus {
            state: inner.state,
            workers_total: inner.workers_total,
            workers_finished: inner.workers_finished,
            elapsed_ms: inner.created_at.elapsed().as_millis() as u64,
        }
    }
}

/// Point-in-time view of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStatus {
    pub state: RunState,
    pub workers_total: usize,
    pub workers_finished: usize,
    pub elapsed_ms: u64,
}
