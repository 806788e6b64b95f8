//! Error types for the counter registry.

use thiserror::Error;

pub type CounterResult<T> = Result<T, CounterError>;

#[derive(Debug, Error)]
pub enum CounterError {
    /// `register` was called on a registry that already started (or
    /// finished) registration.
    #[error("counters already registered")]
    AlreadyRegistered,

    /// The monitoring backend refused the counter definitions. Increments
    /// against this registry fail from then on.
    #[error("counter registration failed: {0}")]
    RegistrationFailed(String),

    #[error("unknown counter: {0}")]
    UnknownCounter(String),

    /// A flush could not be exported. The deltas are still queued and the
    /// next flush will retry them.
    #[error("counter export failed: {0}")]
    PublishFailed(String),
}
