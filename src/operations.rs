/// Tab operations: window partitioning and adjacency runs

use crate::tab_data::{TabId, TabInfo};

/// Split tabs into maximal runs of consecutive indices.
///
/// Tabs are sorted by index first; any gap starts a new run. Callers pass
/// tabs from a single window.
pub fn group_adjacent_tids(tabs: &[TabInfo]) -> Vec<Vec<TabId>> {
    let mut sorted: Vec<&TabInfo> = tabs.iter().collect();
    sorted.sort_by_key(|tab| tab.index);

    let mut runs: Vec<Vec<TabId>> = Vec::new();
    let mut last_index: Option<i32> = None;

    for tab in sorted {
        match (last_index, runs.last_mut()) {
            (Some(last), Some(run)) if tab.index == last + 1 => run.push(tab.id),
            _ => runs.push(vec![tab.id]),
        }
        last_index = Some(tab.index);
    }

    runs
}

/// Partition tabs by window, keeping each window's tabs in their input order
pub fn split_by_window(tabs: &[TabInfo]) -> Vec<Vec<TabInfo>> {
    let mut sorted = tabs.to_vec();
    // Stable, so enumeration order survives within a window
    sorted.sort_by_key(|tab| tab.window_id);

    let mut windows: Vec<Vec<TabInfo>> = Vec::new();
    for tab in sorted {
        match windows.last_mut() {
            Some(window) if window[0].window_id == tab.window_id => window.push(tab),
            _ => windows.push(vec![tab]),
        }
    }

    windows
}
