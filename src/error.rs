//! Error types for batch iteration.

use std::sync::Arc;
use thiserror::Error;

/// Error type for batch iterators and the sources that feed them.
#[derive(Error, Debug, Clone)]
pub enum BatchIterError {
    /// Failure reported by a batch source's drive loop.
    #[error("Source error: {0}")]
    Source(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// Returned from a batch continuation to unwind a source's drive loop
    /// once the consumer has stopped. Never reported by `err()`.
    #[error("iteration stopped")]
    Stopped,

    /// Config error.
    #[error("Config error: {0}")]
    Config(String),

    /// The background worker could not run the source to completion.
    #[error("Worker error: {0}")]
    Worker(String),
}

impl BatchIterError {
    /// Wrap an arbitrary source failure.
    pub fn from_source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        BatchIterError::Source(Arc::new(err))
    }

    /// Whether this is the stop sentinel, possibly wrapped by a source,
    /// rather than a real failure.
    pub fn is_stop(&self) -> bool {
        match self {
            BatchIterError::Stopped => true,
            BatchIterError::Source(err) => {
                let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(&**err);
                while let Some(err) = cause {
                    if let Some(inner) = err.downcast_ref::<BatchIterError>() {
                        return inner.is_stop();
                    }
                    cause = std::error::Error::source(err);
                }
                false
            }
            _ => false,
        }
    }

    /// The wrapped source error, if it is of type `E`.
    pub fn downcast_source<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            BatchIterError::Source(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// A specialized `Result` type for batch iteration.
pub type Result<T> = std::result::Result<T, BatchIterError>;
