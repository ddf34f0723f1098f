//! Serde boundary checks that only make sense inside a JS engine
#![cfg(target_arch = "wasm32")]

use serde::Serialize;
use tab_idler::{PopupRequest, PopupResponse, Settings, TabInfo, TabPreview, TabTrackingEntry};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn tab_from_js_object() {
    let js = js_sys::JSON::parse(
        r#"{"id": 3, "windowId": 1, "index": 0, "active": true, "groupId": -1, "url": "https://a.b/", "title": "x"}"#,
    )
    .unwrap();

    let tab: TabInfo = serde_wasm_bindgen::from_value(js).unwrap();

    assert_eq!(tab.id, 3);
    assert!(tab.active);
    assert!(!tab.is_grouped());
}

#[wasm_bindgen_test]
fn timestamps_stay_numbers() {
    let entry = TabTrackingEntry::new(1, 1_700_000_000_000);
    let js = entry
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap();

    let stamp = js_sys::Reflect::get(&js, &JsValue::from_str("lastDeactivatedTime")).unwrap();
    assert_eq!(stamp.as_f64(), Some(1_700_000_000_000.0));
}

#[wasm_bindgen_test]
fn settings_from_partial_object() {
    let js = js_sys::JSON::parse(r#"{"debug": true}"#).unwrap();
    let settings: Settings = serde_wasm_bindgen::from_value(js).unwrap();
    assert_eq!(settings.minute_ms(), 1000);
}

#[wasm_bindgen_test]
fn popup_round_trip_shapes() {
    let js = js_sys::JSON::parse(r#"{"type": 2}"#).unwrap();
    let value: serde_json::Value = serde_wasm_bindgen::from_value(js).unwrap();
    assert_eq!(PopupRequest::from_value(&value), PopupRequest::Preview);

    let response = PopupResponse::preview(TabPreview::default());
    let js = response
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap();
    let status = js_sys::Reflect::get(&js, &JsValue::from_str("status")).unwrap();
    assert_eq!(status.as_bool(), Some(false));
}
