//! Meridian Permissions
//!
//! Per-origin geolocation decisions:
//! - A decision is allow or deny, optionally with an expiration time
//! - Decisions are keyed by origin (scheme + host + port), never by full URL
//! - Normal browsing persists decisions to the profile preferences
//! - Private browsing keeps decisions in memory only
//! - Expired decisions are dropped at load and evicted lazily on lookup

mod error;
mod events;
mod geolocation;
mod origin;
mod policy;
mod ui_thread;

pub use error::PermissionError;
pub use events::PolicyEvent;
pub use geolocation::{BrowsingMode, GeolocationPermissions, PREF_PREFIX};
pub use origin::Origin;
pub use policy::{Expiration, Policy, DO_NOT_EXPIRE, NO_STATE_EXISTS};
pub use ui_thread::{UiThread, UiThreadLoop};

pub type Result<T> = std::result::Result<T, PermissionError>;
