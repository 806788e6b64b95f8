//! swell-counters — monotonic telemetry counters with deferred
//! registration and batched flushes.
//!
//! The registry accepts increments from the moment it is constructed, but
//! only applies them once the monitoring backend has acknowledged the
//! counter definitions; increments issued during startup park on the
//! readiness gate instead of being dropped. Accumulated deltas are drained
//! to the backend by explicit flushes.
//!
//! ```text
//! increment ──> ready gate ──> delta map ──> flush ──> CounterPublisher
//!                 ▲                             (snapshot, publish,
//!        register └─ backend ack                 deduct once accepted)
//! ```

pub mod attributes;
pub mod error;
pub mod poller;
pub mod publisher;
pub mod registry;
pub mod scaler;

pub use attributes::AttributeSet;
pub use error::{CounterError, CounterResult};
pub use publisher::{CounterPublisher, LogPublisher, PublishFuture, RecordingPublisher};
pub use registry::{CounterDefinition, CounterDelta, CounterRegistry};
