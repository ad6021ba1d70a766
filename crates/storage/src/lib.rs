#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    ACTIVE_COURSE_KEY, AUTH_TOKEN_KEY, InMemoryPreferences, PreferenceStore, Storage,
    StorageError, sanitize_stored_value,
};
