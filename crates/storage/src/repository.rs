use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which the bearer token of the signed-in user is kept.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Key under which the identifier of the course being studied is kept.
pub const ACTIVE_COURSE_KEY: &str = "active_course_identifier";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Normalize a raw stored value.
///
/// Older web builds wrote the literal strings `"null"` and `"undefined"` when
/// clearing a key; those, and blank values, read back as absent.
#[must_use]
pub fn sanitize_stored_value(raw: Option<String>) -> Option<String> {
    raw.filter(|value| {
        let trimmed = value.trim();
        !(trimmed.is_empty() || trimmed == "null" || trimmed == "undefined")
    })
}

/// Small string key/value store that survives restarts.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read a value; missing keys yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and throwaway sessions.
#[derive(Clone, Default)]
pub struct InMemoryPreferences {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferences {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates storage backends behind trait objects for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub preferences: Arc<dyn PreferenceStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let preferences: Arc<dyn PreferenceStore> = Arc::new(InMemoryPreferences::new());
        Self { preferences }
    }
}
