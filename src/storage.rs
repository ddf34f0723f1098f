/// Storage serialization utilities for chrome.storage.local

use std::cell::RefCell;

use log::{debug, warn};
use serde_json::{Value, json};

use crate::error::HostResult;
use crate::host::TabHost;
use crate::tab_data::{TabId, TabTrackingEntry, Thresholds};

pub const TAB_LIST_KEY: &str = "__tab_list";
pub const THRESHOLDS_KEY: &str = "__tab_thresholds";

/// Root storage structure: the tracking list and the threshold pair
#[derive(Debug, Clone, PartialEq)]
pub struct StorageData {
    pub tabs: Vec<TabTrackingEntry>,
    pub thresholds: Thresholds,
}

impl StorageData {
    pub fn new(thresholds: Thresholds) -> Self {
        StorageData {
            tabs: Vec::new(),
            thresholds,
        }
    }

    /// Track a tab, replacing any stale entry with the same id
    pub fn add_entry(&mut self, entry: TabTrackingEntry) {
        match self.tabs.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.tabs.push(entry),
        }
    }

    pub fn remove_entry(&mut self, tab_id: TabId) -> bool {
        let original_len = self.tabs.len();
        self.tabs.retain(|e| e.id != tab_id);
        self.tabs.len() < original_len
    }

    pub fn get_entry(&self, tab_id: TabId) -> Option<&TabTrackingEntry> {
        self.tabs.iter().find(|e| e.id == tab_id)
    }

    /// Mark `tab_id` as the only active tab.
    ///
    /// Previously active entries become inactive; their idle clock restarts
    /// only if they stayed active longer than `skip_threshold_ms`. Returns
    /// `false` when the activated tab was not tracked and had to be created.
    pub fn activate(&mut self, tab_id: TabId, now: i64, skip_threshold_ms: i64) -> bool {
        for entry in self.tabs.iter_mut().filter(|e| e.active) {
            if now - entry.last_activated_time > skip_threshold_ms {
                entry.last_deactivated_time = now;
            }
            entry.active = false;
        }

        match self.tabs.iter_mut().find(|e| e.id == tab_id) {
            Some(entry) => {
                entry.active = true;
                entry.last_activated_time = now;
                entry.last_deactivated_time = now;
                true
            }
            None => {
                let mut entry = TabTrackingEntry::new(tab_id, now);
                entry.active = true;
                self.tabs.push(entry);
                false
            }
        }
    }

    /// Both keys as one object so they are written by a single `set` call
    pub fn to_items(&self) -> Value {
        json!({
            TAB_LIST_KEY: self.tabs,
            THRESHOLDS_KEY: self.thresholds,
        })
    }

    /// Parse the object returned by `storage.local.get`; missing or malformed
    /// keys fall back to an empty list and `fallback` thresholds
    pub fn from_items(items: &Value, fallback: Thresholds) -> Self {
        let tabs = match items.get(TAB_LIST_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                warn!("Discarding unreadable {}: {}", TAB_LIST_KEY, e);
                Vec::new()
            }),
        };

        let thresholds = match items.get(THRESHOLDS_KEY) {
            None | Some(Value::Null) => fallback,
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                warn!("Discarding unreadable {}: {}", THRESHOLDS_KEY, e);
                fallback
            }),
        };

        StorageData { tabs, thresholds }
    }
}

/// Sole owner of the persisted record.
///
/// Keeps the authoritative copy in memory so that a read-modify-write never
/// spans a suspension point, and always persists both keys together.
#[derive(Debug)]
pub struct StateStore {
    cache: RefCell<Option<StorageData>>,
    fallback: Thresholds,
}

impl StateStore {
    pub fn new(fallback: Thresholds) -> Self {
        StateStore {
            cache: RefCell::new(None),
            fallback,
        }
    }

    /// Current record, reading storage on first use
    pub async fn load<H: TabHost>(&self, host: &H) -> HostResult<StorageData> {
        if let Some(data) = self.cache.borrow().as_ref() {
            return Ok(data.clone());
        }

        let items = host.storage_get(&[TAB_LIST_KEY, THRESHOLDS_KEY]).await?;
        let loaded = StorageData::from_items(&items, self.fallback);

        // Another caller may have filled the cache while we were waiting
        let mut cache = self.cache.borrow_mut();
        let data = cache.get_or_insert_with(|| {
            debug!("Loaded {} tracking entries", loaded.tabs.len());
            loaded
        });
        Ok(data.clone())
    }

    /// Apply `f` to the record and persist both keys
    pub async fn update<H, F, R>(&self, host: &H, f: F) -> HostResult<R>
    where
        H: TabHost,
        F: FnOnce(&mut StorageData) -> R,
    {
        self.load(host).await?;

        let (result, items) = {
            let mut cache = self.cache.borrow_mut();
            let data = cache.get_or_insert_with(|| StorageData::new(self.fallback));
            let result = f(data);
            (result, data.to_items())
        };

        host.storage_set(items).await?;
        Ok(result)
    }

    pub async fn get_tab_list<H: TabHost>(&self, host: &H) -> HostResult<Vec<TabTrackingEntry>> {
        Ok(self.load(host).await?.tabs)
    }

    pub async fn set_tab_list<H: TabHost>(
        &self,
        host: &H,
        tabs: Vec<TabTrackingEntry>,
    ) -> HostResult<()> {
        self.update(host, |data| data.tabs = tabs).await
    }

    pub async fn get_thresholds<H: TabHost>(&self, host: &H) -> HostResult<Thresholds> {
        Ok(self.load(host).await?.thresholds)
    }

    pub async fn set_thresholds<H: TabHost>(&self, host: &H, thresholds: Thresholds) -> HostResult<()> {
        self.update(host, |data| data.thresholds = thresholds).await
    }

    pub async fn get_both<H: TabHost>(&self, host: &H) -> HostResult<(Vec<TabTrackingEntry>, Thresholds)> {
        let data = self.load(host).await?;
        Ok((data.tabs, data.thresholds))
    }

    pub async fn set_both<H: TabHost>(
        &self,
        host: &H,
        tabs: Vec<TabTrackingEntry>,
        thresholds: Thresholds,
    ) -> HostResult<()> {
        self.update(host, |data| {
            data.tabs = tabs;
            data.thresholds = thresholds;
        })
        .await
    }
}
