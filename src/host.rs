/// The browser surface the background process drives
use serde_json::Value;

use crate::error::HostResult;
use crate::tab_data::{GroupId, GroupLabel, TabId, TabInfo, WindowId};

/// Everything the background logic needs from the browser.
///
/// The wasm build implements this over `chrome.*`; tests use an in-memory host.
/// Futures are not `Send`: everything runs on the extension's single event loop.
#[allow(async_fn_in_trait)]
pub trait TabHost {
    /// `chrome.tabs.query({})`
    async fn query_tabs(&self) -> HostResult<Vec<TabInfo>>;

    /// `chrome.tabs.get`
    async fn get_tab(&self, id: TabId) -> HostResult<TabInfo>;

    /// `chrome.tabs.group` into a new group in `window_id`
    async fn group(&self, window_id: WindowId, ids: &[TabId]) -> HostResult<GroupId>;

    async fn ungroup(&self, ids: &[TabId]) -> HostResult<()>;

    async fn remove(&self, ids: &[TabId]) -> HostResult<()>;

    /// `chrome.tabGroups.update`
    async fn update_group(&self, group_id: GroupId, label: &GroupLabel) -> HostResult<()>;

    /// Read `keys` from local storage; absent keys are missing from the returned object
    async fn storage_get(&self, keys: &[&str]) -> HostResult<Value>;

    /// Write every key of `items` in one call
    async fn storage_set(&self, items: Value) -> HostResult<()>;

    async fn sleep(&self, ms: u32);

    /// Unix time in milliseconds
    fn now_ms(&self) -> i64;
}
