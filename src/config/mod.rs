//! Configuration
//!
//! The only runtime input is a single environment signal that picks which
//! local address the traffic generator calls to reach the simulated service.
//!
//! ## Address Resolution
//!
//! | `DOCKER_CONTAINER` | Base URL                 |
//! |--------------------|--------------------------|
//! | unset              | `http://localhost:8080`  |
//! | set (any value)    | `http://127.0.0.1:8080`  |
//!
//! The decision is made once, before warmup ends, and handed to the
//! orchestrator as a plain value.

mod target;

pub use target::{CONTAINER_ENV_VAR, ConfigError, DEFAULT_PORT, Deployment, TargetConfig};
