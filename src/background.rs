/// Background state machine: tab lifecycle events drive tracking and regrouping

use log::{debug, info, warn};

use crate::classifier::{StageLists, classify};
use crate::config::{Settings, Whitelist};
use crate::error::HostResult;
use crate::host::TabHost;
use crate::retry::Generation;
use crate::storage::StateStore;
use crate::tab_data::{TabId, TabInfo, TabTrackingEntry};

pub struct Background<H: TabHost> {
    pub(crate) host: H,
    pub(crate) settings: Settings,
    pub(crate) whitelist: Whitelist,
    pub(crate) store: StateStore,
    pub(crate) generation: Generation,
}

/// Live tabs plus their classification, taken at one point in time
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub tabs: Vec<TabInfo>,
    pub stages: StageLists,
}

impl<H: TabHost> Background<H> {
    pub fn new(host: H, settings: Settings) -> Self {
        Background {
            whitelist: Whitelist::new(&settings.whitelist),
            store: StateStore::new(settings.initial_thresholds),
            generation: Generation::new(),
            host,
            settings,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    fn new_entry(&self, tab: &TabInfo, now: i64) -> TabTrackingEntry {
        TabTrackingEntry::new(tab.id, now).white_listed(self.whitelist.matches(&tab.url))
    }

    /// Startup and install: rebuild tracking from the live tabs and reset thresholds
    pub async fn initialize(&self) -> HostResult<()> {
        let tabs = self.host.query_tabs().await?;
        let now = self.host.now_ms();
        let entries: Vec<TabTrackingEntry> = tabs.iter().map(|tab| self.new_entry(tab, now)).collect();

        self.store
            .set_both(&self.host, entries, self.settings.initial_thresholds)
            .await?;
        info!("Initialized tracking for {} tabs", tabs.len());

        self.regroup().await
    }

    pub async fn on_tab_created(&self, tab: TabInfo) -> HostResult<()> {
        let entry = self.new_entry(&tab, self.host.now_ms());
        debug!("Tracking new tab {}", tab.id);
        self.store.update(&self.host, |data| data.add_entry(entry)).await
    }

    pub async fn on_tab_removed(&self, tab_id: TabId) -> HostResult<()> {
        let removed = self
            .store
            .update(&self.host, |data| data.remove_entry(tab_id))
            .await?;
        if !removed {
            debug!("Removed tab {} was not tracked", tab_id);
        }
        Ok(())
    }

    pub async fn on_tab_activated(&self, tab_id: TabId) -> HostResult<()> {
        let now = self.host.now_ms();
        let skip = self.settings.skip_threshold_ms;

        let tracked = self
            .store
            .update(&self.host, |data| data.activate(tab_id, now, skip))
            .await?;
        if !tracked {
            warn!("Activated tab {} was not tracked", tab_id);
        }

        self.regroup().await
    }

    pub async fn on_alarm(&self) -> HostResult<()> {
        self.regroup().await
    }

    /// Classify the live tabs, tracking any tab seen for the first time
    pub async fn snapshot(&self) -> HostResult<Snapshot> {
        let tabs = self.host.query_tabs().await?;
        let (entries, thresholds) = self.store.get_both(&self.host).await?;
        let now = self.host.now_ms();

        let stages = classify(
            &tabs,
            &entries,
            thresholds,
            &self.whitelist,
            now,
            self.settings.minute_ms(),
        );

        if !stages.untracked.is_empty() {
            warn!("Started tracking {} unknown tabs", stages.untracked.len());
            let created: Vec<TabTrackingEntry> = tabs
                .iter()
                .filter(|tab| stages.untracked.contains(&tab.id))
                .map(|tab| self.new_entry(tab, now))
                .collect();
            self.store
                .update(&self.host, |data| created.into_iter().for_each(|e| data.add_entry(e)))
                .await?;
        }

        Ok(Snapshot { tabs, stages })
    }
}
