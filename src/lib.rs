//! Synthtraffic - Synthetic traffic for monitoring pipelines
//!
//! A small simulated service paired with a traffic generator that probes it,
//! used to exercise health checks, error-rate detection and latency alerting
//! under reproducible conditions.
//!
//! ## Architecture
//!
//! - The simulated service answers four routes with fixed or probabilistic
//!   behavior and exposes Prometheus request metrics
//! - The orchestrator waits out a warmup period, then runs one probe worker
//!   per call plan on a bounded pool until they finish or a deadline passes
//! - Workers log each call and carry on regardless of its outcome
//!
//! ## Modules
//!
//! - [`config`] - Base address resolution
//! - [`service`] - Simulated endpoint service
//! - [`plans`] - Call plans and the planned campaigns
//! - [`client`] - HTTP probe client
//! - [`worker`] - Probe worker
//! - [`orchestrator`] - Run sequencing and state

pub mod client;
pub mod config;
pub mod orchestrator;
pub mod plans;
pub mod service;
pub mod worker;

#[cfg(test)]
mod testing;
