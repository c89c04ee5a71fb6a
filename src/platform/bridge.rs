//! Newline-delimited JSON bridge to the browser side.
//!
//! Protocol: one JSON object per line, discriminated by `type`.
//! Inbound:  {"type":"downloadCreated","item":{...}}
//!           {"type":"downloadChanged","delta":{...}}
//!           {"type":"message","message":{...}}
//!           {"type":"surfaceReady","tabId":3}
//!           {"type":"optionsChanged","changes":{"refreshRate":{"newValue":500}}}
//!           {"type":"reply","callId":1,"result":...} or {"type":"reply","callId":1,"error":"..."}
//! Outbound: {"type":"call","callId":1,"method":"search","params":{"id":7}}
//!           {"type":"broadcast","message":{...}}
//!           {"type":"sendTo","tabId":3,"message":{...}}
//!           {"type":"playSound"}

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};

use crate::platform::{DownloadHost, EraseQuery, PresentationSurface};
use crate::types::download::{DownloadDelta, DownloadId, DownloadItem};
use crate::types::errors::{BridgeError, HostError};
use crate::types::message::{SurfaceId, SurfaceMessage};
use crate::types::options::OptionsChange;

/// How long a host call waits for its reply.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// A frame received from the browser side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundFrame {
    DownloadCreated {
        item: DownloadItem,
    },
    DownloadChanged {
        delta: DownloadDelta,
    },
    Message {
        message: Value,
    },
    SurfaceReady {
        #[serde(rename = "tabId")]
        tab_id: SurfaceId,
    },
    OptionsChanged {
        changes: OptionsChange,
    },
    Reply {
        #[serde(rename = "callId")]
        call_id: u64,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        error: Option<String>,
    },
}

/// A frame sent to the browser side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundFrame {
    Call {
        #[serde(rename = "callId")]
        call_id: u64,
        method: String,
        params: Value,
    },
    Broadcast {
        message: SurfaceMessage,
    },
    SendTo {
        #[serde(rename = "tabId")]
        tab_id: SurfaceId,
        message: SurfaceMessage,
    },
    PlaySound,
}

pub fn decode_frame(line: &str) -> Result<InboundFrame, BridgeError> {
    serde_json::from_str(line).map_err(|e| BridgeError::Protocol(format!("bad frame: {}", e)))
}

pub fn encode_frame(frame: &OutboundFrame) -> Result<String, BridgeError> {
    serde_json::to_string(frame).map_err(|e| BridgeError::Protocol(format!("unencodable frame: {}", e)))
}

type Pending = HashMap<u64, oneshot::Sender<Result<Value, String>>>;

/// Host and surface implementation that forwards every call over the bridge.
///
/// Outbound frames go to a channel drained by the writer task; replies are
/// matched to their callers by `callId` through [`BridgeClient::resolve`].
pub struct BridgeClient {
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    pending: Mutex<Pending>,
    next_call_id: AtomicU64,
    timeout: Duration,
}

impl BridgeClient {
    pub fn new(outbound: mpsc::UnboundedSender<OutboundFrame>) -> Self {
        Self::with_timeout(outbound, CALL_TIMEOUT)
    }

    pub fn with_timeout(outbound: mpsc::UnboundedSender<OutboundFrame>, timeout: Duration) -> Self {
        Self {
            outbound,
            pending: Mutex::new(HashMap::new()),
            next_call_id: AtomicU64::new(1),
            timeout,
        }
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sends a call frame and waits for its reply.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, BridgeError> {
        let call_id = self.next_call_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending().insert(call_id, tx);

        let frame = OutboundFrame::Call {
            call_id,
            method: method.to_string(),
            params,
        };
        if self.outbound.send(frame).is_err() {
            self.pending().remove(&call_id);
            return Err(BridgeError::Closed);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(message))) => Err(BridgeError::Protocol(message)),
            Ok(Err(_)) => Err(BridgeError::Closed),
            Err(_) => {
                self.pending().remove(&call_id);
                Err(BridgeError::Io(format!("{} timed out", method)))
            }
        }
    }

    /// Completes a pending call. Returns false for unknown or already answered ids.
    pub fn resolve(&self, call_id: u64, result: Option<Value>, error: Option<String>) -> bool {
        let sender = match self.pending().remove(&call_id) {
            Some(sender) => sender,
            None => return false,
        };
        let outcome = match error {
            Some(message) => Err(message),
            None => Ok(result.unwrap_or(Value::Null)),
        };
        sender.send(outcome).is_ok()
    }

    /// Fails every pending call with `BridgeError::Closed`.
    pub fn close(&self) {
        self.pending().clear();
    }

    pub fn pending_calls(&self) -> usize {
        self.pending().len()
    }

    async fn action(&self, method: &str, id: DownloadId) -> Result<(), HostError> {
        self.call(method, json!({ "id": id }))
            .await
            .map(|_| ())
            .map_err(host_error)
    }

    fn emit(&self, frame: OutboundFrame) -> Result<(), HostError> {
        self.outbound
            .send(frame)
            .map_err(|_| HostError::from(BridgeError::Closed))
    }
}

fn host_error(err: BridgeError) -> HostError {
    match err {
        BridgeError::Protocol(message) => HostError::Rejected(message),
        other => HostError::from(other),
    }
}

#[async_trait]
impl DownloadHost for BridgeClient {
    async fn search(&self, id: DownloadId) -> Result<DownloadItem, HostError> {
        let value = self
            .call("search", json!({ "id": id }))
            .await
            .map_err(host_error)?;
        if value.is_null() {
            return Err(HostError::NotFound(id));
        }
        serde_json::from_value(value)
            .map_err(|e| HostError::Transport(format!("bad download item: {}", e)))
    }

    async fn pause(&self, id: DownloadId) -> Result<(), HostError> {
        self.action("pause", id).await
    }

    async fn resume(&self, id: DownloadId) -> Result<(), HostError> {
        self.action("resume", id).await
    }

    async fn cancel(&self, id: DownloadId) -> Result<(), HostError> {
        self.action("cancel", id).await
    }

    async fn remove_file(&self, id: DownloadId) -> Result<(), HostError> {
        self.action("removeFile", id).await
    }

    async fn erase(&self, query: EraseQuery) -> Result<Vec<DownloadId>, HostError> {
        let params = serde_json::to_value(&query)
            .map_err(|e| HostError::Transport(format!("bad erase query: {}", e)))?;
        let value = self.call("erase", params).await.map_err(host_error)?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value)
            .map_err(|e| HostError::Transport(format!("bad erase reply: {}", e)))
    }

    async fn open(&self, id: DownloadId) -> Result<(), HostError> {
        self.action("open", id).await
    }

    async fn show(&self, id: DownloadId) -> Result<(), HostError> {
        self.action("show", id).await
    }

    async fn open_options_page(&self) -> Result<(), HostError> {
        self.call("openOptionsPage", Value::Null)
            .await
            .map(|_| ())
            .map_err(host_error)
    }
}

#[async_trait]
impl PresentationSurface for BridgeClient {
    async fn broadcast(&self, message: &SurfaceMessage) -> Result<(), HostError> {
        self.emit(OutboundFrame::Broadcast {
            message: message.clone(),
        })
    }

    async fn send_to(&self, surface: SurfaceId, message: &SurfaceMessage) -> Result<(), HostError> {
        self.emit(OutboundFrame::SendTo {
            tab_id: surface,
            message: message.clone(),
        })
    }

    async fn play_completion_sound(&self) -> Result<(), HostError> {
        self.emit(OutboundFrame::PlaySound)
    }
}
