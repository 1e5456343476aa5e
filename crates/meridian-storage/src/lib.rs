//! Meridian Storage Layer
//!
//! SQLite-backed persistence for browser profile state, exposed to the rest
//! of the workspace as a flat key-value preference store.

mod database;
mod error;
mod migrations;
mod preferences;

pub use database::Database;
pub use error::StorageError;
pub use preferences::{MemoryPreferences, PreferenceEdit, PreferenceStore, SqlitePreferences};

pub type Result<T> = std::result::Result<T, StorageError>;
