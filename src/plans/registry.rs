//! Plan registry
//!
//! The four campaigns a traffic run dispatches, one worker each.
//!
//! ## Plan Ordering
//!
//! Plans are registered in route order (health, error, random-error, slow).
//! All four start together, so order only affects dispatch and log order.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::time::Duration;

use super::plan::{Behavior, CallPlan, Endpoint};
use crate::service::{RANDOM_ERROR_PROBABILITY, SLOW_DELAY};

/// Global registry of the planned campaigns, keyed by endpoint name
pub static PLANS: Lazy<IndexMap<&'static str, CallPlan>> = Lazy::new(|| {
    let mut m = IndexMap::new();

    m.insert(
        Endpoint::Health.name(),
        CallPlan::new(
            Endpoint::Health,
            10,
            Duration::from_secs(1),
            Behavior::AlwaysSuccess,
        ),
    );
    m.insert(
        Endpoint::Error.name(),
        CallPlan::new(
            Endpoint::Error,
            5,
            Duration::from_secs(2),
            Behavior::AlwaysFailure,
        ),
    );
    m.insert(
        Endpoint::RandomError.name(),
        CallPlan::new(
            Endpoint::RandomError,
            15,
            Duration::from_millis(1500),
            Behavior::Probabilistic {
                failure_probability: RANDOM_ERROR_PROBABILITY,
            },
        ),
    );
    // Latency is inherent to the call, so no wait between calls
    m.insert(
        Endpoint::Slow.name(),
        CallPlan::new(
            Endpoint::Slow,
            2,
            Duration::ZERO,
            Behavior::FixedLatency {
                latency: SLOW_DELAY,
            },
        ),
    );

    m
});

/// Get a plan by endpoint name
pub fn get_plan(name: &str) -> Option<CallPlan> {
    PLANS.get(name).cloned()
}

/// All planned campaigns, in registration order
pub fn planned() -> Vec<CallPlan> {
    PLANS.values().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_endpoints_planned() {
        assert_eq!(PLANS.len(), 4);
        for endpoint in Endpoint::ALL {
            let plan = get_plan(endpoint.name()).unwrap();
            assert_eq!(plan.endpoint(), endpoint);
        }
    }

    #[test]
    fn test_plan_parameters() {
        let health = get_plan("health").unwrap();
        assert_eq!(health.iterations(), 10);
        assert_eq!(health.inter_call_delay(), Duration::from_secs(1));

        let error = get_plan("error").unwrap();
        assert_eq!(error.iterations(), 5);
        assert_eq!(error.inter_call_delay(), Duration::from_secs(2));

        let random = get_plan("random-error").unwrap();
        assert_eq!(random.iterations(), 15);
        assert_eq!(random.inter_call_delay(), Duration::from_millis(1500));

        let slow = get_plan("slow").unwrap();
        assert_eq!(slow.iterations(), 2);
        assert_eq!(slow.inter_call_delay(), Duration::ZERO);
    }

    #[test]
    fn test_behavior_constants() {
        assert_eq!(
            get_plan("random-error").unwrap().behavior(),
            Behavior::Probabilistic {
                failure_probability: 0.30
            }
        );
        assert_eq!(
            get_plan("slow").unwrap().behavior(),
            Behavior::FixedLatency {
                latency: Duration::from_secs(10)
            }
        );
    }

    #[test]
    fn test_planned_order() {
        let names: Vec<_> = planned().iter().map(|p| p.endpoint().name()).collect();
        assert_eq!(names, vec!["health", "error", "random-error", "slow"]);
    }

    #[test]
    fn test_unknown_plan() {
        assert!(get_plan("unknown").is_none());
    }
}
