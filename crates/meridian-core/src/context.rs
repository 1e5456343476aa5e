//! Browsing context
//!
//! One context per profile. It owns the geolocation store for normal
//! browsing and, while any private tab is open, a second store for private
//! browsing that shares the same preferences but never writes to them.

use parking_lot::RwLock;
use std::sync::Arc;

use meridian_permissions::{BrowsingMode, GeolocationPermissions, UiThread};
use meridian_storage::{Database, PreferenceStore, SqlitePreferences};

use crate::config::Config;
use crate::recently_closed::{RecentlyClosedBridge, RecentlyClosedList};
use crate::Result;

pub type SharedPermissions = Arc<RwLock<GeolocationPermissions>>;

pub struct BrowsingContext {
    config: Config,
    db: Database,
    prefs: Arc<dyn PreferenceStore>,
    ui: UiThread,
    geolocation: SharedPermissions,
    /// Created on first private-browsing request, dropped when the last
    /// private tab closes
    incognito_geolocation: RwLock<Option<SharedPermissions>>,
    recently_closed: Arc<RwLock<RecentlyClosedBridge<RecentlyClosedList>>>,
}

impl BrowsingContext {
    /// Open (or create) the profile database and load persisted state.
    pub fn new(config: Config, ui: UiThread) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Self::with_database(config, db, ui)
    }

    pub fn with_database(config: Config, db: Database, ui: UiThread) -> Result<Self> {
        config.validate()?;

        let prefs: Arc<dyn PreferenceStore> = Arc::new(SqlitePreferences::new(db.clone()));
        let geolocation =
            GeolocationPermissions::load(Arc::clone(&prefs), BrowsingMode::Normal, ui.clone())?;

        let recently_closed = RecentlyClosedBridge::new(
            RecentlyClosedList::new(config.recently_closed_capacity),
            config.recently_closed_default_count,
        );

        tracing::info!(
            database = %config.database_path.display(),
            "Browsing context initialized"
        );

        Ok(Self {
            config,
            db,
            prefs,
            ui,
            geolocation: Arc::new(RwLock::new(geolocation)),
            incognito_geolocation: RwLock::new(None),
            recently_closed: Arc::new(RwLock::new(recently_closed)),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn geolocation_permissions(&self) -> SharedPermissions {
        Arc::clone(&self.geolocation)
    }

    /// The private-browsing store, created from the persisted decisions on
    /// first use.
    pub fn incognito_geolocation_permissions(&self) -> Result<SharedPermissions> {
        if let Some(store) = self.incognito_geolocation.read().as_ref() {
            return Ok(Arc::clone(store));
        }

        let mut slot = self.incognito_geolocation.write();
        // another caller may have won the race for the write lock
        if let Some(store) = slot.as_ref() {
            return Ok(Arc::clone(store));
        }

        let store = GeolocationPermissions::load(
            Arc::clone(&self.prefs),
            BrowsingMode::Private,
            self.ui.clone(),
        )?;
        let store = Arc::new(RwLock::new(store));
        *slot = Some(Arc::clone(&store));

        tracing::debug!("Created private browsing geolocation store");
        Ok(store)
    }

    pub fn is_incognito_created(&self) -> bool {
        self.incognito_geolocation.read().is_some()
    }

    /// Forget every private-browsing decision. Listeners on the private
    /// store see a single clear-all before it is discarded.
    pub fn on_incognito_tabs_removed(&self) {
        let store = self.incognito_geolocation.write().take();
        if let Some(store) = store {
            store.write().clear_all();
            tracing::debug!("Discarded private browsing geolocation store");
        }
    }

    pub fn recently_closed(&self) -> Arc<RwLock<RecentlyClosedBridge<RecentlyClosedList>>> {
        Arc::clone(&self.recently_closed)
    }

    pub fn record_closed_tab(&self, title: impl Into<String>, url: impl Into<String>) -> u32 {
        self.recently_closed.write().source_mut().record(title, url)
    }
}
