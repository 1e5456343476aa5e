//! Policy change notifications

use serde::{Deserialize, Serialize};

/// Emitted by the explicit allow/deny/clear entry points.
///
/// `origin` is the string the caller passed in (after unwrapping an
/// `[expires, origin]` pair), not the normalized key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyEvent {
    Added { origin: String, allowed: bool },
    Cleared { origin: String },
    ClearedAll,
}
