//! Meridian Core
//!
//! Owns the per-profile state that outlives any single page: the profile
//! database, the geolocation permission stores for normal and private
//! browsing, and the recently-closed tab list.

mod config;
mod context;
mod error;
mod recently_closed;

pub use config::Config;
pub use context::{BrowsingContext, SharedPermissions};
pub use error::CoreError;
pub use recently_closed::{
    RecentlyClosedBridge, RecentlyClosedCallback, RecentlyClosedList, RecentlyClosedSource,
    RecentlyClosedTab, TabNavigator,
};

// Re-export core components
pub use meridian_permissions::{
    BrowsingMode, Expiration, GeolocationPermissions, Origin, PermissionError, Policy,
    PolicyEvent, UiThread, UiThreadLoop, DO_NOT_EXPIRE, NO_STATE_EXISTS,
};
pub use meridian_storage::{
    Database, MemoryPreferences, PreferenceEdit, PreferenceStore, SqlitePreferences, StorageError,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A host may have installed its own subscriber already
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
