/// In-memory browser used by the unit tests
use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{HostError, HostResult};
use crate::host::TabHost;
use crate::tab_data::{GroupId, GroupLabel, NO_GROUP, TabId, TabInfo, WindowId};

/// Mutating host calls, recorded per attempt (failed ones included)
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Ungroup(Vec<TabId>),
    Group(WindowId, Vec<TabId>),
    Remove(Vec<TabId>),
    UpdateGroup(GroupId, GroupLabel),
}

pub fn tab(id: TabId, window_id: WindowId, index: i32) -> TabInfo {
    let mut tab = TabInfo::new(id, window_id, index);
    tab.url = format!("https://example.com/{}", id);
    tab
}

#[derive(Debug, Default)]
struct MockState {
    tabs: Vec<TabInfo>,
    next_group: GroupId,
    now: i64,
    storage: Map<String, Value>,
    storage_reads: usize,
    storage_writes: Vec<Value>,
    calls: Vec<Call>,
    sleeps: Vec<u32>,
    failures: HashMap<&'static str, u32>,
}

#[derive(Debug, Default)]
pub struct MockHost {
    state: RefCell<MockState>,
}

impl MockHost {
    pub fn new() -> Self {
        let host = MockHost::default();
        {
            let mut state = host.state.borrow_mut();
            state.now = 1_700_000_000_000;
            state.next_group = 1;
        }
        host
    }

    pub fn with_tabs(tabs: Vec<TabInfo>) -> Self {
        let host = MockHost::new();
        host.state.borrow_mut().tabs = tabs;
        host
    }

    pub fn advance(&self, ms: i64) {
        self.state.borrow_mut().now += ms;
    }

    pub fn add_tab(&self, tab: TabInfo) {
        self.state.borrow_mut().tabs.push(tab);
    }

    pub fn tab(&self, id: TabId) -> Option<TabInfo> {
        self.state.borrow().tabs.iter().find(|t| t.id == id).cloned()
    }

    /// Make `id` the active tab of its window
    pub fn set_active(&self, id: TabId) {
        let mut state = self.state.borrow_mut();
        let window_id = state.tabs.iter().find(|t| t.id == id).map(|t| t.window_id);
        for tab in state.tabs.iter_mut().filter(|t| Some(t.window_id) == window_id) {
            tab.active = tab.id == id;
        }
    }

    pub fn set_favicon(&self, id: TabId, url: Option<&str>) {
        let mut state = self.state.borrow_mut();
        if let Some(tab) = state.tabs.iter_mut().find(|t| t.id == id) {
            tab.fav_icon_url = url.map(str::to_string);
        }
    }

    /// Reject the next `count` calls of `op` ("group", "ungroup", "remove", "update_group")
    pub fn fail_next(&self, op: &'static str, count: u32) {
        self.state.borrow_mut().failures.insert(op, count);
    }

    pub fn seed_storage(&self, items: Value) {
        if let Value::Object(map) = items {
            self.state.borrow_mut().storage.extend(map);
        }
    }

    pub fn storage_snapshot(&self) -> Value {
        Value::Object(self.state.borrow().storage.clone())
    }

    pub fn storage_reads(&self) -> usize {
        self.state.borrow().storage_reads
    }

    pub fn storage_writes(&self) -> Vec<Value> {
        self.state.borrow().storage_writes.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn group_calls(&self) -> Vec<(WindowId, Vec<TabId>)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Group(window_id, ids) => Some((*window_id, ids.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn sleeps(&self) -> Vec<u32> {
        self.state.borrow().sleeps.clone()
    }

    fn record(&self, call: Call, op: &'static str) -> HostResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        match state.failures.get_mut(op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(HostError::rejected(format!("{} rejected", op)))
            }
            _ => Ok(()),
        }
    }
}

impl TabHost for MockHost {
    async fn query_tabs(&self) -> HostResult<Vec<TabInfo>> {
        Ok(self.state.borrow().tabs.clone())
    }

    async fn get_tab(&self, id: TabId) -> HostResult<TabInfo> {
        self.tab(id)
            .ok_or_else(|| HostError::rejected(format!("No tab with id: {}", id)))
    }

    async fn group(&self, window_id: WindowId, ids: &[TabId]) -> HostResult<GroupId> {
        self.record(Call::Group(window_id, ids.to_vec()), "group")?;
        let mut state = self.state.borrow_mut();
        let group_id = state.next_group;
        state.next_group += 1;
        for tab in state.tabs.iter_mut().filter(|t| ids.contains(&t.id)) {
            tab.group_id = group_id;
        }
        Ok(group_id)
    }

    async fn ungroup(&self, ids: &[TabId]) -> HostResult<()> {
        self.record(Call::Ungroup(ids.to_vec()), "ungroup")?;
        let mut state = self.state.borrow_mut();
        for tab in state.tabs.iter_mut().filter(|t| ids.contains(&t.id)) {
            tab.group_id = NO_GROUP;
        }
        Ok(())
    }

    async fn remove(&self, ids: &[TabId]) -> HostResult<()> {
        self.record(Call::Remove(ids.to_vec()), "remove")?;
        self.state.borrow_mut().tabs.retain(|t| !ids.contains(&t.id));
        Ok(())
    }

    async fn update_group(&self, group_id: GroupId, label: &GroupLabel) -> HostResult<()> {
        self.record(Call::UpdateGroup(group_id, label.clone()), "update_group")
    }

    async fn storage_get(&self, keys: &[&str]) -> HostResult<Value> {
        let mut state = self.state.borrow_mut();
        state.storage_reads += 1;
        let found: Map<String, Value> = keys
            .iter()
            .filter_map(|key| state.storage.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect();
        Ok(Value::Object(found))
    }

    async fn storage_set(&self, items: Value) -> HostResult<()> {
        let mut state = self.state.borrow_mut();
        state.storage_writes.push(items.clone());
        match items {
            Value::Object(map) => {
                state.storage.extend(map);
                Ok(())
            }
            other => Err(HostError::Storage(format!("expected an object, got {}", other))),
        }
    }

    async fn sleep(&self, ms: u32) {
        self.state.borrow_mut().sleeps.push(ms);
    }

    fn now_ms(&self) -> i64 {
        self.state.borrow().now
    }
}
