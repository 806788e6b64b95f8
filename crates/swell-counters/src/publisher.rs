//! The monitoring backend seam.
//!
//! The registry never talks to a backend directly; it goes through
//! [`CounterPublisher`], so the aggregation logic can be exercised against
//! an in-memory publisher and wired to a real exporter without changes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::attributes::AttributeSet;
use crate::registry::{CounterDefinition, CounterDelta};

/// Boxed future alias for publisher operations.
pub type PublishFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Sink for counter definitions and aggregated deltas.
///
/// `register` is called once per registry, before any delta is exported;
/// the registry only becomes ready once it resolves. `publish` receives
/// whole flush batches and must either accept the batch or fail it as a
/// unit, since the registry keeps a failed batch queued wholesale.
pub trait CounterPublisher: Send + Sync {
    /// Register counter definitions with the backend.
    fn register<'a>(&'a self, definitions: &'a [CounterDefinition]) -> PublishFuture<'a>;

    /// Export one batch of pre-aggregated deltas.
    fn publish<'a>(&'a self, batch: &'a [CounterDelta]) -> PublishFuture<'a>;
}

/// Publisher that writes counters to the process log instead of a real
/// monitoring backend. The default sink for standalone runs.
#[derive(Debug, Default)]
pub struct LogPublisher;

impl CounterPublisher for LogPublisher {
    fn register<'a>(&'a self, definitions: &'a [CounterDefinition]) -> PublishFuture<'a> {
        Box::pin(async move {
            debug!(counters = definitions.len(), "counter definitions registered");
            Ok(())
        })
    }

    fn publish<'a>(&'a self, batch: &'a [CounterDelta]) -> PublishFuture<'a> {
        Box::pin(async move {
            for delta in batch {
                info!(
                    counter = %delta.name,
                    attributes = %delta.attributes,
                    value = delta.value,
                    "counter exported"
                );
            }
            Ok(())
        })
    }
}

/// In-memory publisher that records everything it is given and can be told
/// to fail. Used by tests across the workspace.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    registered: Mutex<Vec<CounterDefinition>>,
    batches: Mutex<Vec<Vec<CounterDelta>>>,
    fail_register: AtomicBool,
    fail_publish: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `register` calls fail.
    pub fn set_fail_register(&self, fail: bool) {
        self.fail_register.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `publish` calls fail.
    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// The definitions the registry registered, if any.
    pub fn registered(&self) -> Vec<CounterDefinition> {
        lock(&self.registered).clone()
    }

    /// Every successfully published batch, in publish order.
    pub fn batches(&self) -> Vec<Vec<CounterDelta>> {
        lock(&self.batches).clone()
    }

    /// Sum of exported values for one (counter, attributes) pair across
    /// all published batches.
    pub fn exported_total(&self, name: &str, attributes: &AttributeSet) -> u64 {
        lock(&self.batches)
            .iter()
            .flatten()
            .filter(|delta| delta.name == name && &delta.attributes == attributes)
            .map(|delta| delta.value)
            .sum()
    }
}

impl CounterPublisher for RecordingPublisher {
    fn register<'a>(&'a self, definitions: &'a [CounterDefinition]) -> PublishFuture<'a> {
        Box::pin(async move {
            if self.fail_register.load(Ordering::SeqCst) {
                return Err("registration refused".to_string());
            }
            lock(&self.registered).extend_from_slice(definitions);
            Ok(())
        })
    }

    fn publish<'a>(&'a self, batch: &'a [CounterDelta]) -> PublishFuture<'a> {
        Box::pin(async move {
            if self.fail_publish.load(Ordering::SeqCst) {
                return Err("export refused".to_string());
            }
            lock(&self.batches).push(batch.to_vec());
            Ok(())
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_publisher_records_batches() {
        let publisher = RecordingPublisher::new();
        let batch = vec![CounterDelta {
            name: "poller/polling-success".to_string(),
            attributes: AttributeSet::new(),
            value: 3,
        }];

        publisher.publish(&batch).await.unwrap();
        publisher.publish(&batch).await.unwrap();

        assert_eq!(publisher.batches().len(), 2);
        assert_eq!(
            publisher.exported_total("poller/polling-success", &AttributeSet::new()),
            6
        );
    }

    #[tokio::test]
    async fn failure_toggles_apply_to_subsequent_calls() {
        let publisher = RecordingPublisher::new();
        publisher.set_fail_publish(true);
        assert!(publisher.publish(&[]).await.is_err());

        publisher.set_fail_publish(false);
        assert!(publisher.publish(&[]).await.is_ok());
    }
}
