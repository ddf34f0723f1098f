/// Popup message protocol

use futures::future::join_all;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::background::Background;
use crate::classifier::IdleStage;
use crate::error::HostResult;
use crate::host::TabHost;
use crate::retry::{CancelToken, with_retry};
use crate::tab_data::{TabId, TabInfo, Thresholds};

/// A request from the popup, decoded from its `type` discriminant
#[derive(Debug, Clone, PartialEq)]
pub enum PopupRequest {
    /// `{type: 0, level}`
    Close { stage: IdleStage },
    /// `{type: 1, thresholds: [a, b]}`
    UpdateThresholds(Thresholds),
    /// `{type: 2}`
    Preview,
    Unknown,
}

impl PopupRequest {
    pub fn from_value(value: &Value) -> PopupRequest {
        match value.get("type").and_then(Value::as_i64) {
            Some(0) => PopupRequest::Close {
                stage: IdleStage::from_level(value.get("level").and_then(Value::as_i64)),
            },
            Some(1) => match parse_thresholds(value.get("thresholds")) {
                Some(thresholds) => PopupRequest::UpdateThresholds(thresholds),
                None => PopupRequest::Unknown,
            },
            Some(2) => PopupRequest::Preview,
            _ => PopupRequest::Unknown,
        }
    }

    /// Response sent before the request's work runs; `None` for requests
    /// answered asynchronously
    pub fn immediate_response(&self) -> Option<PopupResponse> {
        match self {
            PopupRequest::Preview => None,
            PopupRequest::Unknown => Some(PopupResponse::failed()),
            _ => Some(PopupResponse::ok()),
        }
    }
}

/// Minutes may arrive as numbers or numeric strings from form inputs
fn parse_minutes(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|m| u32::try_from(m).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_thresholds(value: Option<&Value>) -> Option<Thresholds> {
    let pair = value?.as_array()?;
    match pair.as_slice() {
        [first, second, ..] => Some(Thresholds::new(parse_minutes(first)?, parse_minutes(second)?)),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabPreview {
    pub first: Vec<String>,
    pub second: Vec<String>,
}

impl TabPreview {
    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.second.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PopupResponse {
    Status { status: u8 },
    Preview { status: bool, tab_info: TabPreview },
}

impl PopupResponse {
    pub fn ok() -> Self {
        PopupResponse::Status { status: 1 }
    }

    pub fn failed() -> Self {
        PopupResponse::Status { status: 0 }
    }

    pub fn preview(tab_info: TabPreview) -> Self {
        PopupResponse::Preview {
            status: !tab_info.is_empty(),
            tab_info,
        }
    }
}

/// Outcome of a handled request; `refresh` asks the caller to regroup once
/// the response has been delivered
#[derive(Debug, Clone, PartialEq)]
pub struct Handled {
    pub response: PopupResponse,
    pub refresh: bool,
}

impl<H: TabHost> Background<H> {
    pub async fn handle_message(&self, request: PopupRequest) -> HostResult<Handled> {
        debug!("Popup request {:?}", request);
        match request {
            PopupRequest::Close { stage } => {
                self.close_stale(stage).await?;
                Ok(Handled {
                    response: PopupResponse::ok(),
                    refresh: false,
                })
            }
            PopupRequest::UpdateThresholds(thresholds) => {
                self.store.set_thresholds(&self.host, thresholds).await?;
                Ok(Handled {
                    response: PopupResponse::ok(),
                    refresh: true,
                })
            }
            PopupRequest::Preview => {
                let preview = self.preview().await?;
                Ok(Handled {
                    response: PopupResponse::preview(preview),
                    refresh: true,
                })
            }
            PopupRequest::Unknown => Ok(Handled {
                response: PopupResponse::failed(),
                refresh: false,
            }),
        }
    }

    /// Remove every tab in `stage`'s bucket; returns the ids removed
    pub async fn close_stale(&self, stage: IdleStage) -> HostResult<Vec<TabId>> {
        let snapshot = self.snapshot().await?;
        let ids = snapshot.stages.bucket(stage).to_vec();
        if ids.is_empty() {
            return Ok(ids);
        }

        let host = &self.host;
        let targets = ids.as_slice();
        let token = CancelToken::detached();
        with_retry(host, self.settings.retry, &token, "remove", move || host.remove(targets)).await;
        Ok(ids)
    }

    /// Favicon URLs for the first few tabs of each bucket
    pub async fn preview(&self) -> HostResult<TabPreview> {
        let snapshot = self.snapshot().await?;
        let limit = self.settings.preview_limit;

        Ok(TabPreview {
            first: self.favicons(&snapshot.stages.first[..limit.min(snapshot.stages.first.len())]).await,
            second: self.favicons(&snapshot.stages.second[..limit.min(snapshot.stages.second.len())]).await,
        })
    }

    async fn favicons(&self, ids: &[TabId]) -> Vec<String> {
        join_all(ids.iter().map(|id| self.host.get_tab(*id)))
            .await
            .into_iter()
            .filter_map(|result| match result {
                Ok(tab) => Some(self.favicon_or_placeholder(&tab)),
                Err(e) => {
                    warn!("Preview skipped a tab: {}", e);
                    None
                }
            })
            .collect()
    }

    fn favicon_or_placeholder(&self, tab: &TabInfo) -> String {
        match tab.fav_icon_url.as_deref() {
            Some(icon) if Url::parse(icon).is_ok() => icon.to_string(),
            _ => self.settings.placeholder_icon.clone(),
        }
    }
}
