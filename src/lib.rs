/// Tab Idler - Chrome extension that groups tabs by how long they have been idle
/// Built with Rust + WASM

mod background;
mod chrome;
mod classifier;
mod config;
mod error;
mod grouper;
mod host;
mod messages;
mod operations;
mod retry;
mod storage;
mod tab_data;
#[cfg(test)]
mod test_support;

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use log::{info, warn};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

pub use background::{Background, Snapshot};
pub use chrome::ChromeHost;
pub use classifier::{IdleStage, StageLists, classify, group_label, stage_for};
pub use config::{RetryPolicy, Settings, Whitelist};
pub use error::{HostError, HostResult};
pub use host::TabHost;
pub use messages::{Handled, PopupRequest, PopupResponse, TabPreview};
pub use operations::{group_adjacent_tids, split_by_window};
pub use retry::{CancelToken, Generation, with_retry};
pub use storage::{StateStore, StorageData, TAB_LIST_KEY, THRESHOLDS_KEY};
pub use tab_data::{GroupColor, GroupId, GroupLabel, TabId, TabInfo, TabTrackingEntry, Thresholds, WindowId};

thread_local! {
    static BACKGROUND: RefCell<Option<Rc<Background<ChromeHost>>>> = const { RefCell::new(None) };
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}

/// Create the background instance and its alarm; `config` may be undefined
#[wasm_bindgen]
pub fn start_background(config: JsValue) -> Result<(), JsValue> {
    let settings: Settings = if config.is_undefined() || config.is_null() {
        Settings::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };

    wasm_logger::init(wasm_logger::Config::new(settings.log_level()));
    chrome::createAlarm(&settings.alarm_name, settings.alarm_period_minutes);
    info!("Tab Idler started (alarm every {} min)", settings.alarm_period_minutes);

    let background = Rc::new(Background::new(ChromeHost, settings));
    BACKGROUND.with(|slot| *slot.borrow_mut() = Some(background));
    Ok(())
}

fn background() -> Option<Rc<Background<ChromeHost>>> {
    BACKGROUND.with(|slot| slot.borrow().clone())
}

/// Run an event handler on the extension's event loop, logging its failure
fn spawn<F, Fut>(event: &'static str, handler: F)
where
    F: FnOnce(Rc<Background<ChromeHost>>) -> Fut,
    Fut: Future<Output = HostResult<()>> + 'static,
{
    let Some(background) = background() else {
        warn!("{} received before start_background", event);
        return;
    };

    let work = handler(background);
    spawn_local(async move {
        if let Err(e) = work.await {
            warn!("{} failed: {}", event, e);
        }
    });
}

#[wasm_bindgen]
pub fn on_startup() {
    spawn("startup", |bg| async move { bg.initialize().await });
}

#[wasm_bindgen]
pub fn on_installed() {
    spawn("install", |bg| async move { bg.initialize().await });
}

#[wasm_bindgen]
pub fn on_tab_created(tab: JsValue) {
    match serde_wasm_bindgen::from_value::<TabInfo>(tab) {
        Ok(tab) => spawn("tab created", |bg| async move { bg.on_tab_created(tab).await }),
        Err(e) => warn!("Unreadable created tab: {}", e),
    }
}

#[wasm_bindgen]
pub fn on_tab_removed(tab_id: i32) {
    spawn("tab removed", move |bg| async move { bg.on_tab_removed(tab_id).await });
}

#[wasm_bindgen]
pub fn on_tab_activated(tab_id: i32) {
    spawn("tab activated", move |bg| async move { bg.on_tab_activated(tab_id).await });
}

#[wasm_bindgen]
pub fn on_alarm() {
    spawn("alarm", |bg| async move { bg.on_alarm().await });
}

/// `chrome.runtime.onMessage` handler.
///
/// Close and threshold requests are answered right away; previews are
/// answered once computed, so this returns `true` to keep the channel open.
/// A regroup requested by the handler runs after the response is sent.
#[wasm_bindgen]
pub fn on_message(request: JsValue, send_response: js_sys::Function) -> bool {
    let request = serde_wasm_bindgen::from_value::<serde_json::Value>(request)
        .map(|value| PopupRequest::from_value(&value))
        .unwrap_or(PopupRequest::Unknown);

    let immediate = request.immediate_response();
    if let Some(response) = &immediate {
        respond(&send_response, response);
    }
    let deferred = immediate.is_none();

    if request == PopupRequest::Unknown {
        info!("Ignoring unknown popup request");
        return false;
    }

    let Some(bg) = background() else {
        warn!("Popup message received before start_background");
        if deferred {
            respond(&send_response, &PopupResponse::failed());
        }
        return false;
    };

    spawn_local(async move {
        match bg.handle_message(request).await {
            Ok(handled) => {
                if deferred {
                    respond(&send_response, &handled.response);
                }
                if handled.refresh {
                    if let Err(e) = bg.regroup().await {
                        warn!("Refresh after popup request failed: {}", e);
                    }
                }
            }
            Err(e) => {
                warn!("Popup request failed: {}", e);
                if deferred {
                    respond(&send_response, &PopupResponse::failed());
                }
            }
        }
    });

    deferred
}

fn respond(send_response: &js_sys::Function, response: &PopupResponse) {
    let value = match response.serialize(&serde_wasm_bindgen::Serializer::json_compatible()) {
        Ok(value) => value,
        Err(e) => {
            warn!("Cannot encode popup response: {}", e);
            return;
        }
    };
    if let Err(e) = send_response.call1(&JsValue::NULL, &value) {
        warn!("sendResponse failed: {:?}", e);
    }
}
