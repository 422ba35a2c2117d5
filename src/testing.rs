//! Mock probe for unit testing
//!
//! Lets worker and orchestrator tests run against scripted responses and
//! virtual time instead of a live service.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use crate::client::{CallStatus, Probe};
use crate::plans::Endpoint;

/// Scripted behavior of one endpoint
#[derive(Debug, Clone)]
pub struct MockRoute {
    pub status: CallStatus,
    pub latency: Duration,
}

impl MockRoute {
    pub fn ok() -> Self {
        Self::respond(200, "OK")
    }

    pub fn respond(status: u16, body: &str) -> Self {
        Self {
            status: CallStatus::Response {
                status,
                body: body.to_string(),
            },
            latency: Duration::ZERO,
        }
    }

    pub fn refused() -> Self {
        Self {
            status: CallStatus::transport("connection refused"),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Mock probe with per-endpoint scripted responses
///
/// Records when each call started and tracks how many calls are in flight.
#[derive(Debug, Default)]
pub struct MockProbe {
    routes: HashMap<Endpoint, MockRoute>,
    calls: Mutex<Vec<(Endpoint, Instant)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockProbe {
    /// Mock where every endpoint answers 200 immediately
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, endpoint: Endpoint, route: MockRoute) -> Self {
        self.routes.insert(endpoint, route);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of calls made to an endpoint
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().iter().filter(|(e, _)| *e == endpoint).count()
    }

    /// Start instant of the earliest call, if any
    pub fn first_call(&self) -> Option<Instant> {
        self.calls.lock().iter().map(|(_, at)| *at).min()
    }

    /// Highest number of calls observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for MockProbe {
    async fn call(&self, endpoint: Endpoint) -> CallStatus {
        self.calls.lock().push((endpoint, Instant::now()));
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let route = self.routes.get(&endpoint).cloned().unwrap_or_else(MockRoute::ok);
        if !route.latency.is_zero() {
            tokio::time::sleep(route.latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        route.status
    }
}
