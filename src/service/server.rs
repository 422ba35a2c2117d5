//! HTTP Server for the simulated endpoints
//!
//! Axum-based server answering the four simulated routes plus `/metrics`.

use axum::{Router, extract::State, http::StatusCode, middleware, routing::get};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::metrics::{metrics_handler, track_requests};
use super::state::ServiceState;
use crate::plans::Endpoint;

/// Probability that `/api/random-error` answers with an error
pub const RANDOM_ERROR_PROBABILITY: f64 = 0.30;

/// How long `/api/slow` holds a request before answering
pub const SLOW_DELAY: Duration = Duration::from_secs(10);

pub const HEALTH_BODY: &str = "OK";
pub const ERROR_BODY: &str = "Simulated error occurred";
pub const RANDOM_ERROR_BODY: &str = "Random error occurred";
pub const RANDOM_SUCCESS_BODY: &str = "Random error API completed successfully";
pub const SLOW_BODY: &str = "Completed after 10 seconds";

/// Serve the simulated endpoints on an already-bound listener
///
/// Runs until `shutdown` is cancelled, then drains in-flight requests.
pub async fn start_service(
    listener: TcpListener,
    state: ServiceState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let app = create_router(state);

    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Starting simulated endpoint service");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Simulated endpoint service stopped");
    Ok(())
}

/// Create the service router
pub fn create_router(state: ServiceState) -> Router {
    Router::new()
        .route(Endpoint::Health.path(), get(health_handler))
        .route(Endpoint::Error.path(), get(error_handler))
        .route(Endpoint::RandomError.path(), get(random_error_handler))
        .route(Endpoint::Slow.path(), get(slow_handler))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Health endpoint
///
/// Always 200 with a fixed body.
async fn health_handler() -> &'static str {
    HEALTH_BODY
}

/// Error endpoint
///
/// Always 500, for exercising error detection.
async fn error_handler() -> (StatusCode, &'static str) {
    error!("Error API called - simulating an error");
    (StatusCode::INTERNAL_SERVER_ERROR, ERROR_BODY)
}

/// Random error endpoint
///
/// Draws one sample per call and fails when it lands below the error probability.
async fn random_error_handler(State(state): State<ServiceState>) -> (StatusCode, &'static str) {
    let sample = state.draw();

    if sample < RANDOM_ERROR_PROBABILITY {
        error!(sample, "Random error API called - error occurred");
        (StatusCode::INTERNAL_SERVER_ERROR, RANDOM_ERROR_BODY)
    } else {
        info!(sample, "Random error API called - success");
        (StatusCode::OK, RANDOM_SUCCESS_BODY)
    }
}

/// Slow endpoint
///
/// Holds the request for [`SLOW_DELAY`] before answering 200.
async fn slow_handler() -> &'static str {
    info!(delay_secs = SLOW_DELAY.as_secs(), "Slow API called");
    tokio::time::sleep(SLOW_DELAY).await;
    info!("Slow API completed");
    SLOW_BODY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::random::{ScriptedRandom, SeededRandom};
    use axum::body::Body;
    use axum::http::Request;
    use tokio::time::Instant;
    use tower::ServiceExt;

    async fn get_path(app: Router, path: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(ServiceState::new());
        for _ in 0..10 {
            let (status, body) = get_path(app.clone(), "/api/health").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, "OK");
        }
    }

    #[tokio::test]
    async fn test_error_endpoint() {
        let app = create_router(ServiceState::new());
        for _ in 0..5 {
            let (status, body) = get_path(app.clone(), "/api/error").await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "Simulated error occurred");
        }
    }

    #[tokio::test]
    async fn test_random_error_follows_samples() {
        let state = ServiceState::with_random(ScriptedRandom::new([0.0, 0.29, 0.30, 0.99]));
        let app = create_router(state);

        let (status, body) = get_path(app.clone(), "/api/random-error").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Random error occurred");

        let (status, _) = get_path(app.clone(), "/api/random-error").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = get_path(app.clone(), "/api/random-error").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Random error API completed successfully");

        let (status, _) = get_path(app, "/api/random-error").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_random_error_reproducible_with_seed() {
        async fn statuses(seed: u64) -> Vec<StatusCode> {
            let app = create_router(ServiceState::with_random(SeededRandom::new(seed)));
            let mut out = Vec::new();
            for _ in 0..15 {
                out.push(get_path(app.clone(), "/api/random-error").await.0);
            }
            out
        }

        assert_eq!(statuses(42).await, statuses(42).await);
    }

    #[tokio::test]
    async fn test_random_error_rate_converges() {
        let state = ServiceState::with_random(SeededRandom::new(7));
        let app = create_router(state);

        let total = 2000;
        let mut failures = 0;
        for _ in 0..total {
            if get_path(app.clone(), "/api/random-error").await.0 == StatusCode::INTERNAL_SERVER_ERROR {
                failures += 1;
            }
        }

        let rate = failures as f64 / total as f64;
        assert!((rate - RANDOM_ERROR_PROBABILITY).abs() < 0.05, "rate was {rate}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_endpoint_waits() {
        let app = create_router(ServiceState::new());

        let start = Instant::now();
        let (status, body) = get_path(app, "/api/slow").await;

        assert!(start.elapsed() >= SLOW_DELAY);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Completed after 10 seconds");
    }

    #[tokio::test]
    async fn test_metrics_record_routes() {
        let state = ServiceState::new();
        let app = create_router(state.clone());

        get_path(app.clone(), "/api/health").await;
        get_path(app.clone(), "/api/error").await;
        get_path(app.clone(), "/nope").await;

        assert_eq!(state.metrics().count("GET", "/api/health", 200), 1);
        assert_eq!(state.metrics().count("GET", "/api/error", 500), 1);
        assert_eq!(state.metrics().count("GET", "UNKNOWN", 404), 1);

        let (status, body) = get_path(app, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(
            "http_server_requests_seconds_count{method=\"GET\",uri=\"/api/error\",status=\"500\"} 1"
        ));
    }
}
