//! Key-value preference store
//!
//! A flat `key -> string` store in the style of platform shared preferences.
//! Callers namespace their keys with a fixed prefix and serialize values
//! themselves; the store only knows strings.

use chrono::Utc;
use parking_lot::RwLock;
use rusqlite::OptionalExtension;
use std::collections::BTreeMap;

use crate::database::Database;
use crate::Result;

/// One queued change in a batched edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceEdit {
    Put { key: String, value: String },
    Remove { key: String },
}

impl PreferenceEdit {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        PreferenceEdit::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        PreferenceEdit::Remove { key: key.into() }
    }
}

pub trait PreferenceStore: Send + Sync {
    /// All keys currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;

    fn get_string(&self, key: &str) -> Result<Option<String>>;

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.apply(vec![PreferenceEdit::put(key, value)])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.apply(vec![PreferenceEdit::remove(key)])
    }

    /// Apply a batch of edits atomically. An empty batch is a no-op.
    fn apply(&self, edits: Vec<PreferenceEdit>) -> Result<()>;
}

/// Preferences persisted in the profile database.
#[derive(Clone)]
pub struct SqlitePreferences {
    db: Database,
}

impl SqlitePreferences {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl PreferenceStore for SqlitePreferences {
    fn keys(&self) -> Result<Vec<String>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM preferences")?;
            let keys = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(keys)
        })
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.db.with_connection(|conn| {
            let value = conn
                .query_row("SELECT value FROM preferences WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    fn apply(&self, edits: Vec<PreferenceEdit>) -> Result<()> {
        if edits.is_empty() {
            return Ok(());
        }

        let updated_at = Utc::now().to_rfc3339();
        let count = edits.len();

        self.db.transaction(|conn| {
            for edit in &edits {
                match edit {
                    PreferenceEdit::Put { key, value } => {
                        conn.execute(
                            "INSERT OR REPLACE INTO preferences (key, value, updated_at)
                             VALUES (?1, ?2, ?3)",
                            rusqlite::params![key, value, updated_at],
                        )?;
                    }
                    PreferenceEdit::Remove { key } => {
                        conn.execute("DELETE FROM preferences WHERE key = ?1", [key])?;
                    }
                }
            }
            Ok(())
        })?;

        tracing::trace!(edits = count, "Applied preference edits");
        Ok(())
    }
}

/// Preferences held only in memory.
#[derive(Default)]
pub struct MemoryPreferences {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.values.read().keys().cloned().collect())
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn apply(&self, edits: Vec<PreferenceEdit>) -> Result<()> {
        let mut values = self.values.write();
        for edit in edits {
            match edit {
                PreferenceEdit::Put { key, value } => {
                    values.insert(key, value);
                }
                PreferenceEdit::Remove { key } => {
                    values.remove(&key);
                }
            }
        }
        Ok(())
    }
}
