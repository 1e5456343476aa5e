//! Recently closed tabs
//!
//! The bridge is the API the UI talks to; the list of closed tabs itself
//! lives behind [`RecentlyClosedSource`], which an embedder can back with its
//! own engine. [`RecentlyClosedList`] is the in-process implementation.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentlyClosedTab {
    pub id: u32,
    pub title: String,
    pub url: String,
}

/// Fired every time the list of recently closed tabs changes.
pub type RecentlyClosedCallback = Box<dyn Fn() + Send + Sync + 'static>;

pub trait RecentlyClosedSource: Send + Sync {
    /// Newest first, at most `max` entries.
    fn tabs(&self, max: usize) -> Vec<RecentlyClosedTab>;

    /// Remove the entry with `id` so it can be reopened.
    fn restore(&mut self, id: u32) -> Option<RecentlyClosedTab>;

    fn clear(&mut self);

    fn set_callback(&mut self, callback: Option<RecentlyClosedCallback>);
}

/// The tab a recently closed entry is reopened into.
pub trait TabNavigator {
    fn navigate(&mut self, url: &str);
}

pub struct RecentlyClosedBridge<S> {
    source: S,
    default_count: usize,
}

impl<S: RecentlyClosedSource> RecentlyClosedBridge<S> {
    pub fn new(source: S, default_count: usize) -> Self {
        Self {
            source,
            default_count,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Pass `None` to stop notifications.
    pub fn set_recently_closed_callback(&mut self, callback: Option<RecentlyClosedCallback>) {
        self.source.set_callback(callback);
    }

    pub fn recently_closed_tabs(&self, max_tab_count: usize) -> Vec<RecentlyClosedTab> {
        self.source.tabs(max_tab_count)
    }

    pub fn recently_closed_tabs_default(&self) -> Vec<RecentlyClosedTab> {
        self.recently_closed_tabs(self.default_count)
    }

    /// Reopen `recent` in `tab`. Returns false if the entry is already gone.
    pub fn open_recently_closed_tab(
        &mut self,
        tab: &mut dyn TabNavigator,
        recent: &RecentlyClosedTab,
    ) -> bool {
        match self.source.restore(recent.id) {
            Some(restored) => {
                tracing::debug!(id = restored.id, url = %restored.url, "Reopening closed tab");
                tab.navigate(&restored.url);
                true
            }
            None => false,
        }
    }

    pub fn clear_recently_closed_tabs(&mut self) {
        self.source.clear();
    }
}

/// Bounded in-memory list; the oldest entry is dropped when full.
pub struct RecentlyClosedList {
    entries: VecDeque<RecentlyClosedTab>,
    capacity: usize,
    next_id: u32,
    callback: Option<RecentlyClosedCallback>,
}

impl RecentlyClosedList {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
            callback: None,
        }
    }

    /// Record a closed tab, returning its id.
    pub fn record(&mut self, title: impl Into<String>, url: impl Into<String>) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        self.entries.push_front(RecentlyClosedTab {
            id,
            title: title.into(),
            url: url.into(),
        });
        self.entries.truncate(self.capacity);

        self.changed();
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn changed(&self) {
        if let Some(callback) = &self.callback {
            callback();
        }
    }
}

impl RecentlyClosedSource for RecentlyClosedList {
    fn tabs(&self, max: usize) -> Vec<RecentlyClosedTab> {
        self.entries.iter().take(max).cloned().collect()
    }

    fn restore(&mut self, id: u32) -> Option<RecentlyClosedTab> {
        let index = self.entries.iter().position(|tab| tab.id == id)?;
        let tab = self.entries.remove(index);
        self.changed();
        tab
    }

    fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.changed();
    }

    fn set_callback(&mut self, callback: Option<RecentlyClosedCallback>) {
        self.callback = callback;
    }
}
