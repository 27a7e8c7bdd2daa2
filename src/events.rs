//! Outbound event channel. Every asynchronous notification crosses the
//! bridge boundary as one `"<callbackId> <jsonPayload>"` line.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

use crate::logging::log_debug;

/// Per-tick payload emitted by the background worker.
#[derive(Debug, Serialize)]
pub struct TickEvent {
    #[serde(rename = "threadCount")]
    pub thread_count: u64,
}

/// Generic result payload: parse-error reports and async echo replies.
#[derive(Debug, Serialize)]
pub struct ResultEvent<'a> {
    pub result: &'a str,
}

/// Create the outbound event channel. The sender side is cloned into the
/// bridge and its worker; the receiver side belongs to the process loop.
pub fn event_channel() -> (EventSender, Receiver<String>) {
    let (tx, rx) = unbounded();
    (EventSender { tx }, rx)
}

/// Formats events and hands them to the outbound channel. Delivery is
/// fire-and-forget: no acknowledgement is awaited, and a closed channel
/// drops the event with a log line.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<String>,
}

impl EventSender {
    /// Serialize the payload and queue one event line for the callback id.
    pub fn emit<T: Serialize>(&self, callback_id: &str, payload: &T) {
        match serde_json::to_string(payload) {
            Ok(json) => {
                if self.tx.send(format!("{callback_id} {json}")).is_err() {
                    log_debug("event channel closed; event dropped");
                }
            }
            Err(err) => log_debug(&format!("event payload not serializable: {err}")),
        }
    }
}
