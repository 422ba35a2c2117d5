//! Simulated endpoint service
//!
//! Answers four routes with fixed or probabilistic behavior so that a
//! monitoring pipeline has something predictable to observe.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - 200 "OK"
//! - `GET /api/error` - 500 "Simulated error occurred"
//! - `GET /api/random-error` - 500 with probability 0.30, 200 otherwise
//! - `GET /api/slow` - 200 after a 10 second delay
//! - `GET /metrics` - Prometheus request metrics

mod metrics;
pub mod random;
mod server;
mod state;

pub use metrics::{RequestMetrics, UNKNOWN_ROUTE};
pub use random::{OsSeededRandom, RandomSource, ScriptedRandom, SeededRandom};
pub use server::{
    ERROR_BODY, HEALTH_BODY, RANDOM_ERROR_BODY, RANDOM_ERROR_PROBABILITY, RANDOM_SUCCESS_BODY,
    SLOW_BODY, SLOW_DELAY, create_router, start_service,
};
pub use state::ServiceState;
