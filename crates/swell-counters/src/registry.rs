//! The counter registry.
//!
//! A process-wide set of named monotonic counters, owned explicitly and
//! passed to the components that increment them. Registration with the
//! monitoring backend happens once, asynchronously; every increment waits
//! on that registration, so counters bumped during startup are deferred
//! rather than lost. Deltas accumulate per (counter, attribute set) pair
//! and are drained by explicit flushes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, warn};

use crate::attributes::AttributeSet;
use crate::error::{CounterError, CounterResult};
use crate::publisher::CounterPublisher;

/// Identity of a counter, fixed at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterDefinition {
    /// Stable export key, e.g. `poller/polling-success`.
    pub name: String,
    /// Human-readable description for the backend catalog.
    pub description: String,
}

impl CounterDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Accumulated value for one (counter, attribute set) pair within one
/// flush window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterDelta {
    pub name: String,
    pub attributes: AttributeSet,
    pub value: u64,
}

/// Registration lifecycle. Increments apply only in `Ready`; they queue in
/// the two earlier phases and fail in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Initializing,
    Ready,
    Failed(String),
}

struct Inner {
    publisher: Arc<dyn CounterPublisher>,
    phase: watch::Sender<Phase>,
    /// Definitions accepted by the backend, keyed by counter name.
    definitions: RwLock<HashMap<String, CounterDefinition>>,
    /// Deltas not yet acknowledged by the publisher.
    deltas: Mutex<HashMap<(String, AttributeSet), u64>>,
    /// Serializes flushes so a snapshot is never exported twice.
    flush_gate: Mutex<()>,
}

/// Concurrency-safe counter registry with deferred readiness.
///
/// Cheap to clone; all clones share the same counters. Construct one per
/// process (or per test, for isolation) and hand clones to everything that
/// increments.
#[derive(Clone)]
pub struct CounterRegistry {
    inner: Arc<Inner>,
}

impl CounterRegistry {
    /// Create a registry that exports through `publisher`.
    pub fn new(publisher: Arc<dyn CounterPublisher>) -> Self {
        let (phase, _) = watch::channel(Phase::Uninitialized);
        Self {
            inner: Arc::new(Inner {
                publisher,
                phase,
                definitions: RwLock::new(HashMap::new()),
                deltas: Mutex::new(HashMap::new()),
                flush_gate: Mutex::new(()),
            }),
        }
    }

    /// Register counter definitions with the backend.
    ///
    /// Exactly one registration per registry: the first call claims it and
    /// later calls fail with [`CounterError::AlreadyRegistered`] whatever
    /// the outcome of the first. On acknowledgement the registry becomes
    /// ready and queued increments apply; on refusal it enters the failed
    /// state and queued increments return the registration error.
    pub async fn register(&self, definitions: Vec<CounterDefinition>) -> CounterResult<()> {
        let mut claimed = false;
        self.inner.phase.send_if_modified(|phase| {
            if *phase == Phase::Uninitialized {
                *phase = Phase::Initializing;
                claimed = true;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(CounterError::AlreadyRegistered);
        }

        match self.inner.publisher.register(&definitions).await {
            Ok(()) => {
                let count = definitions.len();
                {
                    let mut known = self.inner.definitions.write().await;
                    for definition in definitions {
                        known.insert(definition.name.clone(), definition);
                    }
                }
                // Definitions are visible before the phase flips, so a
                // woken increment always finds its counter.
                self.inner.phase.send_replace(Phase::Ready);
                info!(counters = count, "counter registry ready");
                Ok(())
            }
            Err(reason) => {
                warn!(%reason, "counter registration failed");
                self.inner.phase.send_replace(Phase::Failed(reason.clone()));
                Err(CounterError::RegistrationFailed(reason))
            }
        }
    }

    /// Wait until the backend has acknowledged registration.
    ///
    /// Pending while registration has not completed (or not started),
    /// resolving the moment it does. Fails once registration has been
    /// refused.
    pub async fn ready(&self) -> CounterResult<()> {
        let mut rx = self.inner.phase.subscribe();
        loop {
            {
                let phase = rx.borrow_and_update();
                match &*phase {
                    Phase::Ready => return Ok(()),
                    Phase::Failed(reason) => {
                        return Err(CounterError::RegistrationFailed(reason.clone()));
                    }
                    Phase::Uninitialized | Phase::Initializing => {}
                }
            }
            if rx.changed().await.is_err() {
                return Err(CounterError::RegistrationFailed(
                    "registry dropped before registration completed".to_string(),
                ));
            }
        }
    }

    /// Whether the registry is ready right now. Never blocks.
    pub fn is_ready(&self) -> bool {
        *self.inner.phase.borrow() == Phase::Ready
    }

    /// Increment `name` by one under the given attribute dimensions.
    ///
    /// Waits for readiness first, so increments issued before or during
    /// registration are deferred, never dropped. Incrementing a counter
    /// that was never registered is an error.
    pub async fn increment(&self, name: &str, attributes: AttributeSet) -> CounterResult<()> {
        self.ready().await?;
        if !self.inner.definitions.read().await.contains_key(name) {
            return Err(CounterError::UnknownCounter(name.to_string()));
        }

        let mut deltas = self.inner.deltas.lock().await;
        *deltas.entry((name.to_string(), attributes)).or_insert(0) += 1;
        Ok(())
    }

    /// Drain the accumulated deltas to the publisher.
    ///
    /// Flushes are serialized: concurrent calls queue, and each exports at
    /// most its own snapshot, so no delta is ever counted twice.
    /// Increments racing a flush land in the next window. A delta leaves
    /// the queue only once the publisher has accepted it; a flush that
    /// fails, or is dropped mid-export by an impatient caller, keeps its
    /// deltas queued for the next one. Flushing with nothing pending
    /// publishes nothing.
    pub async fn flush(&self) -> CounterResult<()> {
        let _gate = self.inner.flush_gate.lock().await;

        // Snapshot without dequeueing; amounts come off the queue only
        // after the publisher accepts the batch.
        let snapshot = self.inner.deltas.lock().await.clone();
        if snapshot.is_empty() {
            debug!("counter flush found nothing to export");
            return Ok(());
        }

        let batch = sorted_batch(&snapshot);
        match self.inner.publisher.publish(&batch).await {
            Ok(()) => {
                // Deduct only the exported amounts; increments that landed
                // during the export stay behind for the next window.
                let mut deltas = self.inner.deltas.lock().await;
                for (key, exported) in &snapshot {
                    if let Some(value) = deltas.get_mut(key) {
                        *value = value.saturating_sub(*exported);
                    }
                }
                deltas.retain(|_, value| *value != 0);
                debug!(deltas = batch.len(), "counters flushed");
                Ok(())
            }
            Err(reason) => {
                warn!(%reason, "counter flush failed, deltas stay queued");
                Err(CounterError::PublishFailed(reason))
            }
        }
    }

    /// Snapshot the unflushed deltas without clearing them.
    pub async fn pending(&self) -> Vec<CounterDelta> {
        let deltas = self.inner.deltas.lock().await;
        sorted_batch(&deltas)
    }
}

fn sorted_batch(deltas: &HashMap<(String, AttributeSet), u64>) -> Vec<CounterDelta> {
    let mut batch: Vec<CounterDelta> = deltas
        .iter()
        .map(|((name, attributes), value)| CounterDelta {
            name: name.clone(),
            attributes: attributes.clone(),
            value: *value,
        })
        .collect();
    batch.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.attributes.cmp(&b.attributes)));
    batch
}
