/// `TabHost` over the chrome.* extension APIs

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::error::{HostError, HostResult};
use crate::host::TabHost;
use crate::tab_data::{GroupId, GroupLabel, TabId, TabInfo, WindowId};

// Import JS bridge functions
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabs(window_id: i32, tab_ids: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn ungroupTabs(tab_ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTabs(tab_ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateTabGroup(group_id: i32, properties: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(items: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sleep(ms: u32) -> Result<(), JsValue>;

    pub fn createAlarm(name: &str, period_in_minutes: u32);
}

/// Host backed by the real browser
#[derive(Debug, Default)]
pub struct ChromeHost;

fn rejected(e: JsValue) -> HostError {
    HostError::Rejected(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> HostResult<JsValue> {
    // json_compatible keeps i64 timestamps as plain numbers instead of BigInt
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| HostError::Encode(e.to_string()))
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> HostResult<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| HostError::decode(e.to_string()))
}

impl TabHost for ChromeHost {
    async fn query_tabs(&self) -> HostResult<Vec<TabInfo>> {
        from_js(queryTabs().await.map_err(rejected)?)
    }

    async fn get_tab(&self, id: TabId) -> HostResult<TabInfo> {
        from_js(getTab(id).await.map_err(rejected)?)
    }

    async fn group(&self, window_id: WindowId, ids: &[TabId]) -> HostResult<GroupId> {
        let group_id = groupTabs(window_id, to_js(ids)?).await.map_err(rejected)?;
        from_js(group_id)
    }

    async fn ungroup(&self, ids: &[TabId]) -> HostResult<()> {
        ungroupTabs(to_js(ids)?).await.map_err(rejected)
    }

    async fn remove(&self, ids: &[TabId]) -> HostResult<()> {
        removeTabs(to_js(ids)?).await.map_err(rejected)
    }

    async fn update_group(&self, group_id: GroupId, label: &GroupLabel) -> HostResult<()> {
        updateTabGroup(group_id, to_js(label)?).await.map_err(rejected)
    }

    async fn storage_get(&self, keys: &[&str]) -> HostResult<Value> {
        let items = getStorage(to_js(keys)?)
            .await
            .map_err(|e| HostError::Storage(format!("{:?}", e)))?;
        if items.is_null() || items.is_undefined() {
            return Ok(Value::Object(Default::default()));
        }
        from_js(items)
    }

    async fn storage_set(&self, items: Value) -> HostResult<()> {
        setStorage(to_js(&items)?)
            .await
            .map_err(|e| HostError::Storage(format!("{:?}", e)))
    }

    async fn sleep(&self, ms: u32) {
        let _ = sleep(ms).await;
    }

    fn now_ms(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}
