//! Geolocation permission store
//!
//! Holds one [`Policy`] per [`Origin`]. Every mutation updates the in-memory
//! map first and then issues a fire-and-forget write to the preference
//! store, under the key `PREF_PREFIX + origin` with the value
//! `[allowed, expires_ms]`.
//!
//! Expired policies are evicted lazily, and only by `has_origin`,
//! `expiration_time` and `update`. `is_origin_allowed` treats an expired
//! policy as a denial but leaves it in place, and `origins` lists expired
//! entries too.

use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use meridian_storage::{PreferenceEdit, PreferenceStore};

use crate::events::PolicyEvent;
use crate::origin::Origin;
use crate::policy::{Expiration, Policy, NO_STATE_EXISTS};
use crate::ui_thread::UiThread;
use crate::Result;

/// Namespace for persisted geolocation policies.
pub const PREF_PREFIX: &str = "SweGeolocationPermissions%";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowsingMode {
    Normal,
    /// Decisions live in memory only; storage is never written.
    Private,
}

type Listener = Box<dyn Fn(&PolicyEvent) + Send + Sync + 'static>;

pub struct GeolocationPermissions {
    policies: HashMap<Origin, Policy>,
    prefs: Arc<dyn PreferenceStore>,
    mode: BrowsingMode,
    ui: UiThread,
    listeners: Vec<Listener>,
}

impl GeolocationPermissions {
    /// Load every persisted policy, dropping corrupt and expired entries.
    ///
    /// Dropped entries are deleted from storage in one batch unless `mode`
    /// is private.
    pub fn load(
        prefs: Arc<dyn PreferenceStore>,
        mode: BrowsingMode,
        ui: UiThread,
    ) -> Result<Self> {
        let now = Utc::now();
        let mut candidates: HashMap<Origin, Vec<(String, Policy)>> = HashMap::new();
        let mut edits = Vec::new();
        let mut dropped = 0usize;

        for key in prefs.keys()? {
            let Some(stored_origin) = key.strip_prefix(PREF_PREFIX) else {
                continue;
            };
            let raw = prefs.get_string(&key)?.unwrap_or_else(|| "[]".to_string());

            let policy = match Policy::from_pref_value(&raw) {
                Ok(policy) => policy,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Dropping corrupt geolocation policy");
                    edits.push(PreferenceEdit::remove(key.as_str()));
                    dropped += 1;
                    continue;
                }
            };

            let Some(origin) = Origin::from_url(stored_origin) else {
                tracing::warn!(key = %key, "Dropping geolocation policy with invalid origin");
                edits.push(PreferenceEdit::remove(key.as_str()));
                dropped += 1;
                continue;
            };

            if policy.is_expired_at(now) {
                tracing::debug!(origin = %origin, "Dropping expired geolocation policy");
                edits.push(PreferenceEdit::remove(key.as_str()));
                dropped += 1;
                continue;
            }

            candidates
                .entry(origin)
                .or_insert_with(Vec::new)
                .push((key, policy));
        }

        // Several stored keys may normalize to one origin (older profiles kept
        // a trailing slash or upper case). Keep one policy per origin: the
        // canonical key if present, else the smallest alias. Memory and disk
        // both take that policy and every other alias is deleted.
        let mut policies = HashMap::with_capacity(candidates.len());
        for (origin, mut aliases) in candidates {
            let canonical = pref_key(&origin);
            aliases.sort_by(|(a, _), (b, _)| {
                (*a != canonical)
                    .cmp(&(*b != canonical))
                    .then_with(|| a.cmp(b))
            });

            let mut aliases = aliases.into_iter();
            let Some((chosen_key, policy)) = aliases.next() else {
                continue;
            };
            if chosen_key != canonical {
                edits.push(PreferenceEdit::remove(chosen_key));
                edits.push(PreferenceEdit::put(canonical, policy.to_pref_value()));
            }
            for (alias, _) in aliases {
                tracing::debug!(key = %alias, origin = %origin, "Dropping duplicate geolocation policy");
                edits.push(PreferenceEdit::remove(alias));
                dropped += 1;
            }

            policies.insert(origin, policy);
        }

        let store = Self {
            policies,
            prefs,
            mode,
            ui,
            listeners: Vec::new(),
        };
        store.write_batch(edits);

        tracing::info!(
            loaded = store.policies.len(),
            dropped,
            private = store.is_private(),
            "Loaded geolocation policies"
        );

        Ok(store)
    }

    pub fn mode(&self) -> BrowsingMode {
        self.mode
    }

    pub fn is_private(&self) -> bool {
        self.mode == BrowsingMode::Private
    }

    /// Listeners run synchronously, in registration order, while the caller
    /// still holds whatever lock guards this store. A listener must not lock
    /// the store itself; one that needs to read it back should
    /// [`post`](UiThread::post) that work to the UI thread instead.
    pub fn register_listener<F>(&mut self, listener: F)
    where
        F: Fn(&PolicyEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Create or overwrite the policy for `origin`. Does not notify.
    pub fn set(&mut self, origin: &str, allowed: bool, expires: Expiration) {
        let Some(key) = Origin::from_url(origin) else {
            tracing::debug!(origin, "Ignoring policy for invalid origin");
            return;
        };

        let policy = self
            .policies
            .entry(key.clone())
            .and_modify(|policy| policy.set(allowed, expires))
            .or_insert_with(|| Policy::new(allowed, expires));
        let value = policy.to_pref_value();

        tracing::debug!(origin = %key, allowed, "Set geolocation policy");
        self.write_policy(&key, value);
    }

    /// Change the decision of an existing, unexpired policy.
    ///
    /// An expired policy is evicted instead.
    pub fn update(&mut self, origin: &str, allowed: bool) {
        let Some(key) = Origin::from_url(origin) else {
            return;
        };
        if !self.policies.contains_key(&key) || self.evict_if_expired(&key) {
            return;
        }

        if let Some(policy) = self.policies.get_mut(&key) {
            policy.set_allowed(allowed);
            let value = policy.to_pref_value();
            self.write_policy(&key, value);
        }
    }

    /// Allow geolocation for `input`, which is either an origin or a JSON
    /// pair `[expires_ms, "origin"]`.
    pub fn allow(&mut self, input: &str) {
        self.decide(input, true);
    }

    /// Deny geolocation for `input`; accepts the same forms as [`allow`](Self::allow).
    pub fn deny(&mut self, input: &str) {
        self.decide(input, false);
    }

    fn decide(&mut self, input: &str, allowed: bool) {
        let (origin, expires) = parse_decision(input);
        self.set(&origin, allowed, expires);
        self.notify(&PolicyEvent::Added { origin, allowed });
    }

    pub fn clear(&mut self, origin: &str) {
        let Some(key) = Origin::from_url(origin) else {
            return;
        };

        self.policies.remove(&key);
        self.remove_policy(&key);

        tracing::debug!(origin = %key, "Cleared geolocation policy");
        self.notify(&PolicyEvent::Cleared {
            origin: origin.to_string(),
        });
    }

    pub fn clear_all(&mut self) {
        self.policies.clear();
        self.remove_all_policies();

        tracing::debug!(private = self.is_private(), "Cleared all geolocation policies");
        self.notify(&PolicyEvent::ClearedAll);
    }

    /// Whether `origin` may use geolocation. Expired policies deny but are
    /// not evicted here.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        Origin::from_url(origin)
            .and_then(|key| self.policies.get(&key))
            .is_some_and(|policy| policy.is_allowed_at(Utc::now()))
    }

    /// Whether a live policy exists for `origin`, evicting an expired one.
    pub fn has_origin(&mut self, origin: &str) -> bool {
        match Origin::from_url(origin) {
            Some(key) => self.policies.contains_key(&key) && !self.evict_if_expired(&key),
            None => false,
        }
    }

    /// Expiration of the live policy for `origin`, or `None` when there is
    /// no state. Evicts an expired policy.
    pub fn expiration_time(&mut self, origin: &str) -> Option<Expiration> {
        let key = Origin::from_url(origin)?;
        if !self.policies.contains_key(&key) || self.evict_if_expired(&key) {
            return None;
        }
        self.policies.get(&key).map(Policy::expires)
    }

    /// [`expiration_time`](Self::expiration_time) in the millisecond protocol.
    pub fn expiration_millis(&mut self, origin: &str) -> i64 {
        self.expiration_time(origin)
            .map_or(NO_STATE_EXISTS, |expires| expires.to_millis())
    }

    /// Every stored origin, expired or not.
    pub fn origins(&self) -> BTreeSet<Origin> {
        self.policies.keys().cloned().collect()
    }

    pub fn has_origin_async<F>(&mut self, origin: &str, callback: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let has_origin = self.has_origin(origin);
        self.ui.post(move || callback(has_origin));
    }

    pub fn get_allowed_async<F>(&self, origin: &str, callback: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let allowed = self.is_origin_allowed(origin);
        self.ui.post(move || callback(allowed));
    }

    pub fn get_origins_async<F>(&self, callback: F)
    where
        F: FnOnce(BTreeSet<Origin>) + Send + 'static,
    {
        let origins = self.origins();
        self.ui.post(move || callback(origins));
    }

    pub fn get_expiration_time_async<F>(&mut self, origin: &str, callback: F)
    where
        F: FnOnce(Option<Expiration>) + Send + 'static,
    {
        let expires = self.expiration_time(origin);
        self.ui.post(move || callback(expires));
    }

    fn evict_if_expired(&mut self, key: &Origin) -> bool {
        let expired = self
            .policies
            .get(key)
            .is_some_and(|policy| policy.is_expired_at(Utc::now()));
        if expired {
            self.policies.remove(key);
            self.remove_policy(key);
            tracing::debug!(origin = %key, "Evicted expired geolocation policy");
        }
        expired
    }

    fn notify(&self, event: &PolicyEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    fn write_policy(&self, key: &Origin, value: String) {
        self.write_batch(vec![PreferenceEdit::put(pref_key(key), value)]);
    }

    fn remove_policy(&self, key: &Origin) {
        self.write_batch(vec![PreferenceEdit::remove(pref_key(key))]);
    }

    fn remove_all_policies(&self) {
        if self.is_private() {
            return;
        }

        match self.prefs.keys() {
            Ok(keys) => {
                let edits = keys
                    .into_iter()
                    .filter(|key| key.starts_with(PREF_PREFIX))
                    .map(PreferenceEdit::remove)
                    .collect();
                self.write_batch(edits);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to enumerate geolocation policies");
            }
        }
    }

    fn write_batch(&self, edits: Vec<PreferenceEdit>) {
        if self.is_private() || edits.is_empty() {
            return;
        }
        if let Err(e) = self.prefs.apply(edits) {
            tracing::warn!(error = %e, "Failed to persist geolocation policies");
        }
    }
}

fn pref_key(origin: &Origin) -> String {
    format!("{PREF_PREFIX}{origin}")
}

/// Split an allow/deny argument into origin and expiration.
///
/// Anything that isn't a well-formed `[expires_ms, "origin"]` pair is taken
/// as a plain origin that never expires.
fn parse_decision(input: &str) -> (String, Expiration) {
    serde_json::from_str::<Vec<serde_json::Value>>(input)
        .ok()
        .and_then(|items| {
            // trailing elements are ignored
            let expires = items.first()?.as_i64().and_then(Expiration::from_millis)?;
            let origin = items.get(1)?.as_str()?;
            Some((origin.to_string(), expires))
        })
        .unwrap_or_else(|| (input.to_string(), Expiration::Never))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use meridian_storage::MemoryPreferences;
    use parking_lot::Mutex;

    use crate::ui_thread::UiThreadLoop;

    const ORIGIN: &str = "https://maps.example.com";

    fn store_with(prefs: Arc<MemoryPreferences>, mode: BrowsingMode) -> (GeolocationPermissions, UiThreadLoop) {
        let (ui, ui_loop) = UiThread::channel();
        let store = GeolocationPermissions::load(prefs, mode, ui).unwrap();
        (store, ui_loop)
    }

    fn normal_store() -> (GeolocationPermissions, Arc<MemoryPreferences>, UiThreadLoop) {
        let prefs = Arc::new(MemoryPreferences::new());
        let (store, ui_loop) = store_with(Arc::clone(&prefs), BrowsingMode::Normal);
        (store, prefs, ui_loop)
    }

    fn past() -> Expiration {
        Expiration::At(Utc::now() - Duration::hours(1))
    }

    fn future() -> Expiration {
        Expiration::At(Utc::now() + Duration::hours(1))
    }

    fn recorded_events(store: &mut GeolocationPermissions) -> Arc<Mutex<Vec<PolicyEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        store.register_listener(move |event| sink.lock().push(event.clone()));
        events
    }

    #[test]
    fn test_set_then_allowed_reflects_flag() {
        let (mut store, prefs, _ui) = normal_store();

        store.set(ORIGIN, true, Expiration::Never);
        assert!(store.is_origin_allowed(ORIGIN));

        store.set(ORIGIN, false, Expiration::Never);
        assert!(!store.is_origin_allowed(ORIGIN));

        let key = format!("{PREF_PREFIX}{ORIGIN}");
        assert_eq!(prefs.get_string(&key).unwrap().as_deref(), Some("[false,-1]"));
    }

    #[test]
    fn test_expired_policy_denies_without_eviction() {
        let (mut store, prefs, _ui) = normal_store();
        store.set(ORIGIN, true, past());

        assert!(!store.is_origin_allowed(ORIGIN));
        // read-only lookup leaves the entry in place
        assert_eq!(store.origins().len(), 1);
        assert_eq!(prefs.len(), 1);
    }

    #[test]
    fn test_has_origin_evicts_expired() {
        let (mut store, prefs, _ui) = normal_store();
        store.set(ORIGIN, true, past());

        assert!(!store.has_origin(ORIGIN));
        assert!(store.origins().is_empty());
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_has_origin_for_live_policy() {
        let (mut store, _prefs, _ui) = normal_store();
        store.set(ORIGIN, false, future());

        assert!(store.has_origin("https://maps.example.com/some/page"));
        assert!(!store.has_origin("https://other.example.com"));
        assert!(!store.has_origin("garbage"));
    }

    #[test]
    fn test_origin_normalization_on_lookup() {
        let (mut store, _prefs, _ui) = normal_store();
        store.set("https://a.example:443", true, Expiration::Never);

        assert!(store.is_origin_allowed("https://a.example:443/path?x=1"));
        assert!(store.is_origin_allowed("https://a.example"));
        assert!(!store.is_origin_allowed("http://a.example"));
    }

    #[test]
    fn test_invalid_origin_is_ignored() {
        let (mut store, prefs, _ui) = normal_store();
        store.set("about:blank", true, Expiration::Never);
        store.set("", true, Expiration::Never);

        assert!(store.origins().is_empty());
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_clear_removes_memory_and_storage() {
        let (mut store, prefs, _ui) = normal_store();
        let events = recorded_events(&mut store);
        store.set(ORIGIN, true, Expiration::Never);

        store.clear("https://maps.example.com/route");

        assert!(!store.has_origin(ORIGIN));
        assert!(prefs.is_empty());
        assert_eq!(
            *events.lock(),
            vec![PolicyEvent::Cleared {
                origin: "https://maps.example.com/route".to_string()
            }]
        );
    }

    #[test]
    fn test_clear_invalid_origin_does_not_notify() {
        let (mut store, _prefs, _ui) = normal_store();
        let events = recorded_events(&mut store);

        store.clear("not a url");
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_clear_all() {
        let (mut store, prefs, _ui) = normal_store();
        prefs.put_string("unrelated", "keep").unwrap();
        let events = recorded_events(&mut store);

        store.set("https://a.example", true, Expiration::Never);
        store.set("https://b.example", false, future());
        store.clear_all();

        assert!(store.origins().is_empty());
        assert_eq!(prefs.keys().unwrap(), vec!["unrelated".to_string()]);
        assert_eq!(*events.lock(), vec![PolicyEvent::ClearedAll]);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let (mut store, prefs, _ui) = normal_store();
        store.update(ORIGIN, true);

        assert!(!store.has_origin(ORIGIN));
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_update_keeps_expiration() {
        let (mut store, _prefs, _ui) = normal_store();
        let expires = future();
        store.set(ORIGIN, false, expires);

        store.update(ORIGIN, true);

        assert!(store.is_origin_allowed(ORIGIN));
        assert_eq!(store.expiration_time(ORIGIN), Some(expires));
    }

    #[test]
    fn test_update_expired_evicts() {
        let (mut store, prefs, _ui) = normal_store();
        store.set(ORIGIN, false, past());

        store.update(ORIGIN, true);

        assert!(store.origins().is_empty());
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_allow_and_deny_notify() {
        let (mut store, _prefs, _ui) = normal_store();
        let events = recorded_events(&mut store);

        store.allow(ORIGIN);
        store.deny("https://tracker.example");

        assert!(store.is_origin_allowed(ORIGIN));
        assert_eq!(store.expiration_time(ORIGIN), Some(Expiration::Never));
        assert!(store.has_origin("https://tracker.example"));
        assert!(!store.is_origin_allowed("https://tracker.example"));
        assert_eq!(
            *events.lock(),
            vec![
                PolicyEvent::Added {
                    origin: ORIGIN.to_string(),
                    allowed: true
                },
                PolicyEvent::Added {
                    origin: "https://tracker.example".to_string(),
                    allowed: false
                },
            ]
        );
    }

    #[test]
    fn test_allow_with_expiration_pair() {
        let (mut store, _prefs, _ui) = normal_store();
        let expires = Utc::now() + Duration::days(1);
        let input = format!("[{}, \"{ORIGIN}\"]", expires.timestamp_millis());

        store.allow(&input);

        assert!(store.is_origin_allowed(ORIGIN));
        assert_eq!(
            store.expiration_millis(ORIGIN),
            expires.timestamp_millis()
        );
    }

    #[test]
    fn test_malformed_pair_falls_back_to_literal_origin() {
        let (mut store, _prefs, _ui) = normal_store();
        let events = recorded_events(&mut store);
        let input = "[\"soon\", \"https://maps.example.com\"]";

        store.allow(input);

        // the literal isn't a valid origin, so nothing is stored
        assert!(store.origins().is_empty());
        assert_eq!(
            *events.lock(),
            vec![PolicyEvent::Added {
                origin: input.to_string(),
                allowed: true
            }]
        );

        store.deny("https://plain.example/path");
        assert_eq!(
            store.expiration_time("https://plain.example"),
            Some(Expiration::Never)
        );
    }

    #[test]
    fn test_expiration_time_no_state() {
        let (mut store, _prefs, _ui) = normal_store();
        assert_eq!(store.expiration_time(ORIGIN), None);
        assert_eq!(store.expiration_millis(ORIGIN), NO_STATE_EXISTS);
        assert_eq!(store.expiration_millis("::"), NO_STATE_EXISTS);

        store.set(ORIGIN, true, past());
        assert_eq!(store.expiration_time(ORIGIN), None);
        assert!(store.origins().is_empty());
    }

    #[test]
    fn test_origins_include_expired() {
        let (mut store, _prefs, _ui) = normal_store();
        store.set("https://a.example", true, past());
        store.set("https://b.example", true, Expiration::Never);

        let origins: Vec<String> = store.origins().iter().map(|o| o.to_string()).collect();
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_load_drops_expired_and_corrupt() {
        let prefs = Arc::new(MemoryPreferences::new());
        let live = Policy::new(true, future());
        let expired = Policy::new(true, past());
        prefs
            .put_string(&format!("{PREF_PREFIX}https://live.example"), &live.to_pref_value())
            .unwrap();
        prefs
            .put_string(&format!("{PREF_PREFIX}https://old.example"), &expired.to_pref_value())
            .unwrap();
        prefs
            .put_string(&format!("{PREF_PREFIX}https://bad.example"), "[true]")
            .unwrap();
        prefs
            .put_string(&format!("{PREF_PREFIX}https://worse.example"), "{oops")
            .unwrap();
        prefs.put_string("other%https://live.example", "[true,-1]").unwrap();

        let (mut store, _ui) = store_with(Arc::clone(&prefs), BrowsingMode::Normal);

        let origins: Vec<String> = store.origins().iter().map(|o| o.to_string()).collect();
        assert_eq!(origins, vec!["https://live.example"]);
        assert!(store.is_origin_allowed("https://live.example"));
        assert!(!store.has_origin("https://other.example"));

        let mut keys = prefs.keys().unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                format!("{PREF_PREFIX}https://live.example"),
                "other%https://live.example".to_string(),
            ]
        );
    }

    #[test]
    fn test_load_rewrites_legacy_trailing_slash_keys() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs
            .put_string(&format!("{PREF_PREFIX}https://legacy.example/"), "[false,-1]")
            .unwrap();

        let (store, _ui) = store_with(Arc::clone(&prefs), BrowsingMode::Normal);

        assert!(store.origins().contains(&Origin::from_url("https://legacy.example").unwrap()));
        assert_eq!(
            prefs.keys().unwrap(),
            vec![format!("{PREF_PREFIX}https://legacy.example")]
        );
    }

    fn assert_alias_collapse(aliases: &[(&str, &str)], expect_allowed: bool) {
        let prefs = Arc::new(MemoryPreferences::new());
        for (stored_origin, value) in aliases {
            prefs
                .put_string(&format!("{PREF_PREFIX}{stored_origin}"), value)
                .unwrap();
        }

        let (store, _ui) = store_with(Arc::clone(&prefs), BrowsingMode::Normal);
        assert_eq!(store.is_origin_allowed("https://a.example"), expect_allowed);
        assert_eq!(store.origins().len(), 1);

        // exactly one key survives and it holds the in-memory decision
        let canonical = format!("{PREF_PREFIX}https://a.example");
        assert_eq!(prefs.keys().unwrap(), vec![canonical.clone()]);
        let on_disk = Policy::from_pref_value(&prefs.get_string(&canonical).unwrap().unwrap())
            .unwrap();
        assert_eq!(on_disk.allowed(), expect_allowed);

        let (reloaded, _ui) = store_with(prefs, BrowsingMode::Normal);
        assert_eq!(reloaded.is_origin_allowed("https://a.example"), expect_allowed);
    }

    #[test]
    fn test_load_prefers_canonical_key_over_aliases() {
        // upper-case alias iterates before the canonical key
        assert_alias_collapse(
            &[("HTTPS://A.EXAMPLE", "[true,-1]"), ("https://a.example", "[false,-1]")],
            false,
        );
        // trailing-slash alias iterates after it
        assert_alias_collapse(
            &[("https://a.example", "[false,-1]"), ("https://a.example/", "[true,-1]")],
            false,
        );
        assert_alias_collapse(
            &[("https://a.example", "[true,-1]"), ("HTTPS://A.EXAMPLE/", "[false,-1]")],
            true,
        );
    }

    #[test]
    fn test_load_collapses_aliases_without_canonical_key() {
        // smallest alias wins: "HTTPS://A.EXAMPLE/" < "https://a.example/"
        assert_alias_collapse(
            &[("https://a.example/", "[true,-1]"), ("HTTPS://A.EXAMPLE/", "[false,-1]")],
            false,
        );
        assert_alias_collapse(
            &[("https://a.example/", "[false,-1]"), ("HTTPS://A.EXAMPLE/", "[true,-1]")],
            true,
        );
    }

    #[test]
    fn test_load_ignores_expired_alias() {
        let live = Policy::new(true, future()).to_pref_value();
        let expired = Policy::new(false, past()).to_pref_value();
        assert_alias_collapse(
            &[("https://a.example", expired.as_str()), ("https://a.example/", live.as_str())],
            true,
        );
    }

    #[test]
    fn test_reload_sees_persisted_policies() {
        let (mut store, prefs, _ui) = normal_store();
        store.allow("https://a.example");
        store.deny("https://b.example");
        drop(store);

        let (reloaded, _ui) = store_with(prefs, BrowsingMode::Normal);
        assert!(reloaded.is_origin_allowed("https://a.example"));
        assert!(!reloaded.is_origin_allowed("https://b.example"));
        assert_eq!(reloaded.origins().len(), 2);
    }

    #[test]
    fn test_private_mode_never_writes() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs
            .put_string(&format!("{PREF_PREFIX}https://old.example"), "[true,0]")
            .unwrap();
        prefs
            .put_string(&format!("{PREF_PREFIX}https://kept.example"), "[true,-1]")
            .unwrap();

        let (mut store, _ui) = store_with(Arc::clone(&prefs), BrowsingMode::Private);
        assert!(store.is_private());
        assert!(store.is_origin_allowed("https://kept.example"));

        store.allow(ORIGIN);
        store.clear("https://kept.example");
        store.clear_all();

        // expired entry survives load too: private mode never deletes
        assert_eq!(prefs.len(), 2);
        assert!(prefs.get_string(&format!("{PREF_PREFIX}{ORIGIN}")).unwrap().is_none());
    }

    #[test]
    fn test_async_variants_deliver_on_ui_loop() {
        let (mut store, _prefs, mut ui_loop) = normal_store();
        store.set(ORIGIN, true, Expiration::Never);
        store.set("https://gone.example", true, past());

        let results = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&results);
        store.has_origin_async(ORIGIN, move |has| sink.lock().push(format!("has:{has}")));
        let sink = Arc::clone(&results);
        store.get_allowed_async("https://gone.example", move |allowed| {
            sink.lock().push(format!("allowed:{allowed}"))
        });
        let sink = Arc::clone(&results);
        store.get_origins_async(move |origins| sink.lock().push(format!("origins:{}", origins.len())));
        let sink = Arc::clone(&results);
        store.get_expiration_time_async("https://gone.example", move |expires| {
            sink.lock().push(format!("expires:{}", expires.is_some()))
        });

        // computed eagerly, delivered later
        assert!(results.lock().is_empty());
        assert_eq!(store.origins().len(), 1);

        assert_eq!(ui_loop.run_until_idle(), 4);
        assert_eq!(
            *results.lock(),
            vec!["has:true", "allowed:false", "origins:2", "expires:false"]
        );
    }

    #[test]
    fn test_parse_decision() {
        assert_eq!(
            parse_decision("[1700000000000,\"https://a.example\"]"),
            (
                "https://a.example".to_string(),
                Expiration::from_millis(1_700_000_000_000).unwrap()
            )
        );
        assert_eq!(
            parse_decision("[-1,\"https://a.example\"]"),
            ("https://a.example".to_string(), Expiration::Never)
        );
        assert_eq!(
            parse_decision("https://a.example"),
            ("https://a.example".to_string(), Expiration::Never)
        );
        assert_eq!(
            parse_decision("[1700000000000,\"https://a.example\",\"extra\"]"),
            (
                "https://a.example".to_string(),
                Expiration::from_millis(1_700_000_000_000).unwrap()
            )
        );
        assert_eq!(
            parse_decision("[1700000000000]"),
            ("[1700000000000]".to_string(), Expiration::Never)
        );
        assert_eq!(
            parse_decision("[1,2]"),
            ("[1,2]".to_string(), Expiration::Never)
        );
    }
}
