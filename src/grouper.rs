/// Grouping of idle tabs into labelled tab groups

use futures::future::join_all;
use log::{debug, info};

use crate::background::Background;
use crate::classifier::group_label;
use crate::error::HostResult;
use crate::host::TabHost;
use crate::operations::{group_adjacent_tids, split_by_window};
use crate::retry::{CancelToken, with_retry};
use crate::tab_data::{GroupId, NO_GROUP, TabId, TabInfo, WindowId};

impl<H: TabHost> Background<H> {
    /// Full reclassification cycle.
    ///
    /// Ungroups every grouped tab in one call, waits for it, then groups the
    /// first bucket labelled with T0 and the second with T1. Starting a new
    /// regroup cancels the pending retries of this one.
    pub async fn regroup(&self) -> HostResult<()> {
        let token = self.generation.advance();
        debug!("regroup");

        let snapshot = self.snapshot().await?;
        let thresholds = self.store.get_thresholds(&self.host).await?;

        let grouped: Vec<TabId> = snapshot
            .tabs
            .iter()
            .filter(|tab| tab.is_grouped())
            .map(|tab| tab.id)
            .collect();

        if !grouped.is_empty() {
            let host = &self.host;
            let ids = grouped.as_slice();
            with_retry(host, self.settings.retry, &token, "ungroup", move || host.ungroup(ids)).await;
        }

        self.group_tabs(&snapshot.stages.first, thresholds.first(), &token).await;
        self.group_tabs(&snapshot.stages.second, thresholds.second(), &token).await;
        Ok(())
    }

    /// Group `ids` per window into runs of adjacent tabs, labelling each
    /// group for `elapsed_minutes` of idleness
    pub async fn group_tabs(&self, ids: &[TabId], elapsed_minutes: u32, token: &CancelToken) {
        if ids.is_empty() || token.is_cancelled() {
            return;
        }

        let resolved = join_all(ids.iter().map(|id| self.host.get_tab(*id))).await;
        let tabs: Vec<TabInfo> = resolved
            .into_iter()
            .zip(ids)
            .filter_map(|(result, id)| match result {
                Ok(tab) => Some(tab),
                Err(e) => {
                    debug!("Skipping tab {}: {}", id, e);
                    None
                }
            })
            .collect();

        for window in split_by_window(&tabs) {
            let window_id = window[0].window_id;
            for run in group_adjacent_tids(&window) {
                self.group_run(window_id, &run, elapsed_minutes, token).await;
            }
        }
    }

    async fn group_run(&self, window_id: WindowId, run: &[TabId], elapsed_minutes: u32, token: &CancelToken) {
        let host = &self.host;
        let group_id = with_retry(host, self.settings.retry, token, "group", move || {
            host.group(window_id, run)
        })
        .await;

        match group_id {
            Some(group_id) if group_id != NO_GROUP => self.label_group(group_id, elapsed_minutes).await,
            _ => {}
        }
    }

    /// Color and title a freshly created group using the latest thresholds
    async fn label_group(&self, group_id: GroupId, elapsed_minutes: u32) {
        let thresholds = match self.store.get_thresholds(&self.host).await {
            Ok(thresholds) => thresholds,
            Err(e) => {
                info!("Cannot label group {}: {}", group_id, e);
                return;
            }
        };

        let Some(label) = group_label(elapsed_minutes, thresholds) else {
            return;
        };

        if let Err(e) = self.host.update_group(group_id, &label).await {
            info!("No group {}: {}", group_id, e);
        }
    }
}
