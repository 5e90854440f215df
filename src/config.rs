//! Adapter configuration.

use crate::{BatchIterError, Result};

/// Default number of items per batch.
pub const DEFAULT_BATCH_SIZE: usize = 1 << 10;

/// Default name of the background worker thread.
pub const DEFAULT_WORKER_NAME: &str = "batch-iter-worker";

/// Configuration for a [`BatchAdapter`](crate::BatchAdapter)
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Maximum number of items per batch
    pub batch_size: usize,
    /// Name given to the worker thread driving the source
    pub worker_name: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            worker_name: DEFAULT_WORKER_NAME.to_string(),
        }
    }
}

impl AdapterConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_worker_name(mut self, worker_name: impl Into<String>) -> Self {
        self.worker_name = worker_name.into();
        self
    }

    /// Reject configurations the adapter cannot run with
    pub fn validate(&self) -> Result<()> {
        validate_batch_size(self.batch_size)
    }
}

pub(crate) fn validate_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(BatchIterError::Config(
            "batch size must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = AdapterConfig::default()
            .with_batch_size(16)
            .with_worker_name("users-scan");

        assert_eq!(config.batch_size, 16);
        assert_eq!(config.worker_name, "users-scan");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = AdapterConfig::default();
        assert_eq!(config.batch_size, 1024);
        assert_eq!(config.worker_name, DEFAULT_WORKER_NAME);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = AdapterConfig::default().with_batch_size(0).validate().unwrap_err();
        assert!(matches!(err, BatchIterError::Config(_)));
    }
}
