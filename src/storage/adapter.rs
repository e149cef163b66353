//! Storage adapter SPI
//!
//! Backends implement this narrow capability interface. Only the factory, the
//! codec helpers and the migration engine talk to adapters directly; entity
//! services go through the collection helpers in `services`.

use async_trait::async_trait;

use crate::error::{TouchlineError, TouchlineResult};

#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Raw value stored under `key`, if any
    async fn get(&self, key: &str) -> TouchlineResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> TouchlineResult<()>;

    /// Removing a missing key is not an error
    async fn remove(&self, key: &str) -> TouchlineResult<()>;

    /// All keys currently present
    async fn keys(&self) -> TouchlineResult<Vec<String>>;

    fn backend_name(&self) -> &'static str;

    /// Release the backend. Every later call fails with `StorageUnavailable`.
    async fn dispose(&self) -> TouchlineResult<()>;

    fn is_disposed(&self) -> bool;
}

/// Error returned by an adapter after `dispose`
pub(crate) fn disposed_error(backend: &'static str) -> TouchlineError {
    TouchlineError::StorageUnavailable {
        backend,
        reason: "adapter has been disposed".into(),
    }
}

/// Keys become file names, so keep them to a conservative character set
pub(crate) fn check_key(key: &str) -> TouchlineResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(TouchlineError::ValidationFailed(format!(
            "invalid storage key '{}'",
            key
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_key() {
        assert!(check_key("savedSoccerGames").is_ok());
        assert!(check_key("soccer_roster-2").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("../escape").is_err());
        assert!(check_key("with space").is_err());
    }
}
