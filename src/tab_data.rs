/// Data structures for Tab Idler
use serde::{Deserialize, Serialize};

pub type TabId = i32;
pub type WindowId = i32;
pub type GroupId = i32;

/// `chrome.tabGroups.TAB_GROUP_ID_NONE`
pub const NO_GROUP: GroupId = -1;

/// The parts of a browser tab the background process reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    #[serde(default)]
    pub window_id: WindowId,
    #[serde(default)]
    pub index: i32,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default = "no_group")]
    pub group_id: GroupId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
}

fn no_group() -> GroupId {
    NO_GROUP
}

impl TabInfo {
    pub fn new(id: TabId, window_id: WindowId, index: i32) -> TabInfo {
        TabInfo {
            id,
            window_id,
            index,
            active: false,
            pinned: false,
            group_id: NO_GROUP,
            url: String::new(),
            fav_icon_url: None,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id != NO_GROUP
    }
}

/// Activity record kept for every known tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabTrackingEntry {
    pub id: TabId,
    pub active: bool,
    pub last_activated_time: i64,
    pub last_deactivated_time: i64,
    #[serde(default)]
    pub is_white_list: bool,
}

impl TabTrackingEntry {
    /// A fresh, inactive entry whose idle clock starts at `now`
    pub fn new(id: TabId, now: i64) -> TabTrackingEntry {
        TabTrackingEntry {
            id,
            active: false,
            last_activated_time: now,
            last_deactivated_time: now,
            is_white_list: false,
        }
    }

    pub fn white_listed(mut self, is_white_list: bool) -> TabTrackingEntry {
        self.is_white_list = is_white_list;
        self
    }

    pub fn idle_ms(&self, now: i64) -> i64 {
        now - self.last_deactivated_time
    }
}

/// The two idle cutoffs in minutes, stored as `[first, second]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds(pub [u32; 2]);

impl Thresholds {
    pub fn new(first: u32, second: u32) -> Thresholds {
        Thresholds([first, second])
    }

    pub fn first(&self) -> u32 {
        self.0[0]
    }

    pub fn second(&self) -> u32 {
        self.0[1]
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds::new(15, 60)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Yellow,
    Red,
}

/// Color and title applied to a tab group via `chrome.tabGroups.update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLabel {
    pub color: GroupColor,
    pub title: String,
}
