//! Inbound message handler.
//!
//! Presentation surfaces share a loosely-typed channel with other senders, so
//! every message is decoded here into an [`IntentEvent`]. Anything that is not
//! a well-formed intent is dropped without an error.

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use crate::managers::download_manager::ManagerEvent;
use crate::types::message::IntentEvent;

/// Decodes a raw message into an intent, or `None` if it is not one.
pub fn decode_intent(message: &Value) -> Option<IntentEvent> {
    let event = message.get("event").and_then(Value::as_str)?;

    match IntentEvent::deserialize(message) {
        Ok(intent) => Some(intent),
        Err(e) => {
            tracing::debug!(event, error = %e, "ignoring malformed message");
            None
        }
    }
}

/// Decodes a JSON text message. Unparseable text is ignored.
pub fn decode_intent_str(text: &str) -> Option<IntentEvent> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => decode_intent(&value),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring non-JSON message");
            None
        }
    }
}

/// Decodes `message` and forwards it to the manager.
///
/// Returns true if the message was an intent and the manager is still running.
pub fn handle_message(events: &UnboundedSender<ManagerEvent>, message: &Value) -> bool {
    match decode_intent(message) {
        Some(intent) => events.send(ManagerEvent::Intent(intent)).is_ok(),
        None => false,
    }
}
