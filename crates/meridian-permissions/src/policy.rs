//! Allow/deny decisions with optional expiration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PermissionError;
use crate::Result;

/// Millisecond value meaning "never expires unless explicitly cleared".
pub const DO_NOT_EXPIRE: i64 = -1;

/// Millisecond value reported when an origin has no (live) decision.
pub const NO_STATE_EXISTS: i64 = -2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expiration {
    Never,
    At(DateTime<Utc>),
}

impl Expiration {
    /// Decode the millisecond protocol. `DO_NOT_EXPIRE` maps to `Never`;
    /// values chrono cannot represent yield `None`.
    pub fn from_millis(millis: i64) -> Option<Self> {
        if millis == DO_NOT_EXPIRE {
            return Some(Expiration::Never);
        }
        DateTime::<Utc>::from_timestamp_millis(millis).map(Expiration::At)
    }

    pub fn to_millis(&self) -> i64 {
        match self {
            Expiration::Never => DO_NOT_EXPIRE,
            Expiration::At(at) => at.timestamp_millis(),
        }
    }

    /// An expiration at or before `now` has passed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Expiration::Never => false,
            Expiration::At(at) => *at <= now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    allowed: bool,
    expires: Expiration,
}

impl Policy {
    pub fn new(allowed: bool, expires: Expiration) -> Self {
        Self { allowed, expires }
    }

    /// The stored flag, regardless of expiration.
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    pub fn expires(&self) -> Expiration {
        self.expires
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_expired_at(now)
    }

    /// Expired policies always deny.
    pub fn is_allowed_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && self.allowed
    }

    pub(crate) fn set_allowed(&mut self, allowed: bool) {
        self.allowed = allowed;
    }

    pub(crate) fn set(&mut self, allowed: bool, expires: Expiration) {
        self.allowed = allowed;
        self.expires = expires;
    }

    /// Serialize as the persisted `[allowed, expires_ms]` pair.
    pub fn to_pref_value(&self) -> String {
        Value::Array(vec![
            Value::Bool(self.allowed),
            Value::from(self.expires.to_millis()),
        ])
        .to_string()
    }

    pub fn from_pref_value(raw: &str) -> Result<Self> {
        let items: Vec<Value> = serde_json::from_str(raw)?;
        let [allowed, expires] = items.as_slice() else {
            return Err(PermissionError::CorruptPolicy(format!(
                "expected 2 elements, found {}",
                items.len()
            )));
        };

        let allowed = allowed
            .as_bool()
            .ok_or_else(|| PermissionError::CorruptPolicy(format!("bad allow flag: {allowed}")))?;
        let expires = expires
            .as_i64()
            .and_then(Expiration::from_millis)
            .ok_or_else(|| PermissionError::CorruptPolicy(format!("bad expiration: {expires}")))?;

        Ok(Self { allowed, expires })
    }
}
