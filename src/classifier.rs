/// Idle-time classification of live tabs

use log::debug;

use crate::config::Whitelist;
use crate::tab_data::{GroupColor, GroupLabel, TabId, TabInfo, TabTrackingEntry, Thresholds};

/// How stale a tab is relative to the threshold pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleStage {
    Fresh,
    First,
    Second,
}

impl IdleStage {
    /// Popup `level` field: 0 is the first stage, anything else the second
    pub fn from_level(level: Option<i64>) -> IdleStage {
        match level {
            Some(0) => IdleStage::First,
            _ => IdleStage::Second,
        }
    }
}

/// Result of one classification pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageLists {
    pub first: Vec<TabId>,
    pub second: Vec<TabId>,
    /// Live tabs with no tracking entry
    pub untracked: Vec<TabId>,
}

impl StageLists {
    pub fn bucket(&self, stage: IdleStage) -> &[TabId] {
        match stage {
            IdleStage::First => &self.first,
            IdleStage::Second => &self.second,
            IdleStage::Fresh => &[],
        }
    }
}

/// Stage for `idle_ms`: below T0 fresh, below T1 first, otherwise second
pub fn stage_for(idle_ms: i64, thresholds: Thresholds, minute_ms: i64) -> IdleStage {
    if idle_ms < thresholds.first() as i64 * minute_ms {
        IdleStage::Fresh
    } else if idle_ms < thresholds.second() as i64 * minute_ms {
        IdleStage::First
    } else {
        IdleStage::Second
    }
}

/// Partition eligible live tabs into the two idle buckets.
///
/// Output keeps the host's enumeration order. Active, white-listed and
/// tracked-as-active tabs are skipped; tabs without an entry are reported
/// in `untracked` instead of being classified.
pub fn classify(
    tabs: &[TabInfo],
    entries: &[TabTrackingEntry],
    thresholds: Thresholds,
    whitelist: &Whitelist,
    now: i64,
    minute_ms: i64,
) -> StageLists {
    let mut lists = StageLists::default();

    for tab in tabs {
        if tab.active || whitelist.matches(&tab.url) {
            continue;
        }

        let Some(entry) = entries.iter().find(|e| e.id == tab.id) else {
            debug!("Tab {} has no tracking entry", tab.id);
            lists.untracked.push(tab.id);
            continue;
        };

        if entry.active || entry.is_white_list {
            continue;
        }

        match stage_for(entry.idle_ms(now), thresholds, minute_ms) {
            IdleStage::Fresh => {}
            IdleStage::First => lists.first.push(tab.id),
            IdleStage::Second => lists.second.push(tab.id),
        }
    }

    lists
}

/// Human-readable age for a threshold: "45m", "2h"
pub fn age_text(minutes: u32) -> String {
    if minutes < 60 {
        format!("{}m", minutes)
    } else {
        format!("{}h", minutes / 60)
    }
}

/// Color and title for a group whose tabs have been idle `elapsed_minutes`.
///
/// Uses the same two-threshold comparison as classification; `None` when the
/// elapsed time is below the first threshold.
pub fn group_label(elapsed_minutes: u32, thresholds: Thresholds) -> Option<GroupLabel> {
    if elapsed_minutes >= thresholds.second() {
        Some(GroupLabel {
            color: GroupColor::Red,
            title: age_text(thresholds.second()),
        })
    } else if elapsed_minutes >= thresholds.first() {
        Some(GroupLabel {
            color: GroupColor::Yellow,
            title: age_text(thresholds.first()),
        })
    } else {
        None
    }
}
