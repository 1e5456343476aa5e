//! Origin normalization

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A web security principal: scheme, host and port.
///
/// Default ports are elided, so `https://a.example:443/x` and
/// `https://a.example` are the same origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(String);

impl Origin {
    /// Derive the origin of a URL, dropping path, query and fragment.
    ///
    /// Returns `None` for unparsable input and for URLs with an opaque
    /// origin (`data:`, `about:`, `file:` and friends).
    pub fn from_url(input: &str) -> Option<Self> {
        let url = Url::parse(input.trim()).ok()?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return None;
        }
        Some(Self(origin.ascii_serialization()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Origin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
