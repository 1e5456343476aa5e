//! Profile configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the profile database
    pub database_path: PathBuf,
    /// How many closed tabs to remember
    pub recently_closed_capacity: usize,
    /// How many closed tabs to list when the caller doesn't say
    pub recently_closed_default_count: usize,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("meridian.db"),
            recently_closed_capacity: 25,
            recently_closed_default_count: 5,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Meridian"))
            .unwrap_or_else(|| PathBuf::from(".meridian"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.recently_closed_capacity == 0 {
            return Err(CoreError::Config(
                "recently_closed_capacity must be at least 1".to_string(),
            ));
        }
        if self.recently_closed_default_count > self.recently_closed_capacity {
            return Err(CoreError::Config(format!(
                "recently_closed_default_count ({}) exceeds capacity ({})",
                self.recently_closed_default_count, self.recently_closed_capacity
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(
            target_os = "windows",
            target_os = "macos",
            target_os = "linux",
            target_os = "android"
        )))]
        {
            None
        }
    }
}
