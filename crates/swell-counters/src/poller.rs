//! Well-known counters recorded by the metrics poller.
//!
//! Polling outcomes are counted per cluster; request outcomes are counted
//! per message, with no cluster dimensions.

use swell_core::ClusterRef;
use tracing::warn;

use crate::attributes::AttributeSet;
use crate::registry::{CounterDefinition, CounterRegistry};

pub const POLLING_SUCCESS: &str = "poller/polling-success";
pub const POLLING_FAILED: &str = "poller/polling-failed";
pub const REQUESTS_SUCCESS: &str = "poller/requests-success";
pub const REQUESTS_FAILED: &str = "poller/requests-failed";

/// Definitions for every poller counter, ready for registration.
pub fn definitions() -> Vec<CounterDefinition> {
    vec![
        CounterDefinition::new(
            POLLING_SUCCESS,
            "The number of cluster polling events that succeeded",
        ),
        CounterDefinition::new(
            POLLING_FAILED,
            "The number of cluster polling events that failed",
        ),
        CounterDefinition::new(
            REQUESTS_SUCCESS,
            "The number of polling request messages handled successfully",
        ),
        CounterDefinition::new(
            REQUESTS_FAILED,
            "The number of polling request messages that failed",
        ),
    ]
}

/// Count one successfully polled cluster.
pub async fn inc_polling_success(registry: &CounterRegistry, cluster: &ClusterRef) {
    record(registry, POLLING_SUCCESS, AttributeSet::for_cluster(cluster)).await;
}

/// Count one cluster whose polling cycle failed.
pub async fn inc_polling_failed(registry: &CounterRegistry, cluster: &ClusterRef) {
    record(registry, POLLING_FAILED, AttributeSet::for_cluster(cluster)).await;
}

/// Count one request message handled end to end.
pub async fn inc_requests_success(registry: &CounterRegistry) {
    record(registry, REQUESTS_SUCCESS, AttributeSet::new()).await;
}

/// Count one request message that could not be handled.
pub async fn inc_requests_failed(registry: &CounterRegistry) {
    record(registry, REQUESTS_FAILED, AttributeSet::new()).await;
}

/// Telemetry is best-effort: a failed increment is logged and swallowed so
/// it can never break the polling path it instruments.
async fn record(registry: &CounterRegistry, name: &str, attributes: AttributeSet) {
    if let Err(e) = registry.increment(name, attributes).await {
        warn!(counter = name, error = %e, "counter increment dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{CLUSTER_INSTANCE_ID, CLUSTER_PROJECT_ID};
    use crate::publisher::RecordingPublisher;
    use std::sync::Arc;

    #[tokio::test]
    async fn polling_counters_carry_cluster_identity() {
        let publisher = Arc::new(RecordingPublisher::new());
        let registry = CounterRegistry::new(publisher.clone());
        registry.register(definitions()).await.unwrap();

        let cluster = ClusterRef::new("proj-1", "cache-a");
        inc_polling_success(&registry, &cluster).await;
        inc_polling_failed(&registry, &cluster).await;
        inc_requests_success(&registry).await;

        registry.flush().await.unwrap();

        let expected = AttributeSet::new()
            .with(CLUSTER_PROJECT_ID, "proj-1")
            .with(CLUSTER_INSTANCE_ID, "cache-a");
        assert_eq!(publisher.exported_total(POLLING_SUCCESS, &expected), 1);
        assert_eq!(publisher.exported_total(POLLING_FAILED, &expected), 1);
        assert_eq!(
            publisher.exported_total(REQUESTS_SUCCESS, &AttributeSet::new()),
            1
        );
    }

    #[tokio::test]
    async fn helpers_swallow_registry_errors() {
        let publisher = Arc::new(RecordingPublisher::new());
        publisher.set_fail_register(true);
        let registry = CounterRegistry::new(publisher);
        let _ = registry.register(definitions()).await;

        // Registration failed, so the increment fails inside; the helper
        // must still return.
        inc_requests_failed(&registry).await;
        assert!(registry.pending().await.is_empty());
    }
}
