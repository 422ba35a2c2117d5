//! Prometheus metrics for the simulated service
//!
//! Exposes request metrics in Prometheus text format at `/metrics`, using the
//! same names a Spring Boot actuator emits so existing dashboards and alert
//! rules work unchanged.
//!
//! ## Metrics Exposed
//!
//! - `http_server_requests_seconds_bucket` - Latency histogram buckets
//! - `http_server_requests_seconds_count` - Requests served
//! - `http_server_requests_seconds_sum` - Total time spent serving
//! - `http_server_requests_seconds_max` - Slowest request seen
//!
//! Every series is labelled with `method`, `uri` (the route template) and
//! `status`.
//!
//! ## Example Queries
//!
//! ```text
//! # p95 latency of the slow endpoint
//! histogram_quantile(0.95, sum(rate(http_server_requests_seconds_bucket{uri="/api/slow"}[5m])) by (le))
//!
//! # error rate in percent
//! sum(rate(http_server_requests_seconds_count{status=~"5.."}[5m]))
//!   / sum(rate(http_server_requests_seconds_count[5m])) * 100
//! ```

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::state::ServiceState;

/// Route label for requests that matched no route
pub const UNKNOWN_ROUTE: &str = "UNKNOWN";

/// Histogram bucket upper bounds, in seconds
const BUCKETS: [f64; 13] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0,
];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SeriesKey {
    method: String,
    uri: String,
    status: u16,
}

#[derive(Debug, Clone, Default)]
struct SeriesStats {
    count: u64,
    sum: Duration,
    max: Duration,
    /// Cumulative counts, one per entry in `BUCKETS`
    buckets: [u64; BUCKETS.len()],
}

/// Thread-safe store of per-route request statistics
#[derive(Debug, Clone, Default)]
pub struct RequestMetrics {
    inner: Arc<RwLock<BTreeMap<SeriesKey, SeriesStats>>>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one served request
    pub fn record(&self, method: &str, uri: &str, status: u16, latency: Duration) {
        let key = SeriesKey {
            method: method.to_string(),
            uri: uri.to_string(),
            status,
        };
        let secs = latency.as_secs_f64();

        let mut series = self.inner.write();
        let stats = series.entry(key).or_default();
        stats.count += 1;
        stats.sum += latency;
        stats.max = stats.max.max(latency);
        for (bound, bucket) in BUCKETS.iter().zip(stats.buckets.iter_mut()) {
            if secs <= *bound {
                *bucket += 1;
            }
        }
    }

    /// Number of requests recorded for a route and status
    pub fn count(&self, method: &str, uri: &str, status: u16) -> u64 {
        let key = SeriesKey {
            method: method.to_string(),
            uri: uri.to_string(),
            status,
        };
        self.inner.read().get(&key).map(|s| s.count).unwrap_or(0)
    }

    /// Total number of requests recorded across all series
    pub fn total(&self) -> u64 {
        self.inner.read().values().map(|s| s.count).sum()
    }

    /// Render all series in Prometheus text exposition format
    pub fn render(&self) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail
        let _ = self.render_into(&mut output);
        output
    }

    fn render_into(&self, output: &mut String) -> std::fmt::Result {
        let series = self.inner.read();

        writeln!(
            output,
            "# HELP http_server_requests_seconds Duration of HTTP server request handling"
        )?;
        writeln!(output, "# TYPE http_server_requests_seconds histogram")?;
        for (key, stats) in series.iter() {
            let labels = labels(key);
            for (bound, bucket) in BUCKETS.iter().zip(stats.buckets.iter()) {
                writeln!(
                    output,
                    "http_server_requests_seconds_bucket{{{labels},le=\"{bound}\"}} {bucket}"
                )?;
            }
            writeln!(
                output,
                "http_server_requests_seconds_bucket{{{labels},le=\"+Inf\"}} {}",
                stats.count
            )?;
            writeln!(
                output,
                "http_server_requests_seconds_count{{{labels}}} {}",
                stats.count
            )?;
            writeln!(
                output,
                "http_server_requests_seconds_sum{{{labels}}} {}",
                stats.sum.as_secs_f64()
            )?;
        }
        writeln!(output)?;

        writeln!(
            output,
            "# HELP http_server_requests_seconds_max Slowest request handled"
        )?;
        writeln!(output, "# TYPE http_server_requests_seconds_max gauge")?;
        for (key, stats) in series.iter() {
            writeln!(
                output,
                "http_server_requests_seconds_max{{{}}} {}",
                labels(key),
                stats.max.as_secs_f64()
            )?;
        }

        Ok(())
    }
}

fn labels(key: &SeriesKey) -> String {
    format!(
        "method=\"{}\",uri=\"{}\",status=\"{}\"",
        key.method, key.uri, key.status
    )
}

/// Middleware recording method, route template, status and latency of every request
pub async fn track_requests(
    State(state): State<ServiceState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let uri = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_ROUTE.to_string());

    let response = next.run(request).await;

    state
        .metrics()
        .record(&method, &uri, response.status().as_u16(), start.elapsed());

    response
}

/// Generate Prometheus-format metrics
pub async fn metrics_handler(State(state): State<ServiceState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics().render(),
    )
}
