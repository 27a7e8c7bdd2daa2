//! Command dispatch: one inbound line in, one synchronous status string out,
//! with asynchronous results flowing through the outbound event channel.

use std::sync::{Arc, Mutex};

use crate::command::{classify, parse_command, BridgeCommand};
use crate::compose::{build_compose_data, build_mailto};
use crate::config::{AppConfig, PayloadMode};
use crate::events::{EventSender, ResultEvent};
use crate::invoke::{InvokePayload, InvokeRequest, Invoker};
use crate::logging::log_debug;
use crate::options::{parse_options, PARSE_ERROR_RESULT};
use crate::worker::Ticker;

/// One bridge instance: owns the invoker, the ticker worker, and the event
/// sender. Dispatch is synchronous from the caller's viewpoint; only
/// `stopThread` blocks (on the worker join).
pub struct Bridge {
    invoker: Arc<dyn Invoker>,
    events: EventSender,
    ticker: Ticker,
    target: String,
    payload_mode: PayloadMode,
    property: Mutex<i64>,
}

impl Bridge {
    pub fn new(invoker: Arc<dyn Invoker>, events: EventSender, config: &AppConfig) -> Self {
        let ticker = Ticker::new(config.tick_interval(), events.clone());
        Self {
            invoker,
            events,
            ticker,
            target: config.composer_target.clone(),
            payload_mode: config.payload_mode,
            property: Mutex::new(0),
        }
    }

    /// Dispatch one wire command line and return its status string.
    ///
    /// Unrecognized names echo back as `name + ";" + line` so callers detect
    /// protocol drift without the bridge dying; nothing on this path panics
    /// or returns an error.
    pub fn invoke_method(&self, line: &str) -> String {
        match classify(parse_command(line)) {
            BridgeCommand::IsAvailable => {
                if self.invoker.is_available() {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            BridgeCommand::Open {
                callback_id,
                argument,
            } => self.open(&callback_id, &argument),
            BridgeCommand::StartThread { callback_id } => {
                self.ticker.start(&callback_id).to_string()
            }
            BridgeCommand::StopThread => self.ticker.stop().to_string(),
            BridgeCommand::Echo { argument } => argument,
            BridgeCommand::EchoAsync {
                callback_id,
                argument,
            } => {
                self.events
                    .emit(&callback_id, &ResultEvent { result: &argument });
                String::new()
            }
            BridgeCommand::Property { argument } => self.handle_property(&argument),
            BridgeCommand::Unrecognized { name } => format!("{name};{line}"),
        }
    }

    fn open(&self, callback_id: &str, argument: &str) -> String {
        let options = match parse_options(argument) {
            Ok(options) => options,
            Err(err) => {
                log_debug(&format!("open: options rejected: {err}"));
                self.events.emit(
                    callback_id,
                    &ResultEvent {
                        result: PARSE_ERROR_RESULT,
                    },
                );
                return "fail".to_string();
            }
        };

        let payload = match self.payload_mode {
            PayloadMode::Mailto => InvokePayload::MailtoUri(build_mailto(&options)),
            PayloadMode::Structured => InvokePayload::Structured(build_compose_data(&options)),
        };
        let request = InvokeRequest::compose(&self.target, payload);

        match self.invoker.submit(&request) {
            Ok(()) => "success".to_string(),
            Err(err) => {
                log_debug(&format!("open: invocation failed: {err:#}"));
                "fail".to_string()
            }
        }
    }

    /// Integer argument sets the property; anything else reads it back.
    fn handle_property(&self, argument: &str) -> String {
        let mut value = self.property.lock().unwrap_or_else(|e| e.into_inner());
        match argument.trim().parse::<i64>() {
            Ok(next) => {
                *value = next;
                String::new()
            }
            Err(_) => value.to_string(),
        }
    }

    /// Stop the worker if it is still running (process shutdown path).
    pub fn shutdown(&self) {
        if self.ticker.is_running() {
            let _ = self.ticker.stop();
        }
    }
}
