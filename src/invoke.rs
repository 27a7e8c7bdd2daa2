//! Invocation descriptors and their submission to the platform service.
//!
//! The bridge never presents a composer itself; it shapes a descriptor and
//! hands it off. The default submitter shells out to an opener command,
//! mirroring how the platform routes a compose request to whichever
//! application claims the target.

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::compose::ComposeData;
use crate::logging::log_debug;

/// Invocation action understood by the platform composer.
pub const ACTION_COMPOSE: &str = "compose-email";
/// MIME type attached to every compose invocation.
pub const MIME_RFC822: &str = "message/rfc822";

/// One submission to the invocation service. Built per `open`, used once,
/// then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    pub action: &'static str,
    pub target: String,
    pub mime_type: &'static str,
    pub payload: InvokePayload,
}

/// Payload shape: a flat URI for URI-based platforms, a structured map for
/// platforms that take key/value compose data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokePayload {
    MailtoUri(String),
    Structured(ComposeData),
}

impl Serialize for InvokePayload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            InvokePayload::MailtoUri(uri) => serializer.serialize_str(uri),
            InvokePayload::Structured(data) => data.serialize(serializer),
        }
    }
}

/// Wire form of the descriptor consumed by invoke commands that take JSON.
#[derive(Serialize)]
struct Descriptor<'a> {
    action: &'a str,
    target: &'a str,
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: &'a InvokePayload,
}

impl InvokeRequest {
    /// Build a compose descriptor for the given target.
    pub fn compose(target: &str, payload: InvokePayload) -> Self {
        Self {
            action: ACTION_COMPOSE,
            target: target.to_string(),
            mime_type: MIME_RFC822,
            payload,
        }
    }

    /// Serialize the full descriptor as one JSON document.
    pub fn descriptor_json(&self) -> Result<String> {
        serde_json::to_string(&Descriptor {
            action: self.action,
            target: &self.target,
            mime_type: self.mime_type,
            data: &self.payload,
        })
        .context("failed to serialize invocation descriptor")
    }
}

/// Seam between the bridge and the platform invocation service. The default
/// implementation shells out; tests substitute a recording mock.
pub trait Invoker: Send + Sync {
    /// Whether the platform can service compose invocations right now.
    fn is_available(&self) -> bool;

    /// Hand one request to the service. Fire-and-forget: `Ok` means the
    /// service accepted the request, not that the composer finished.
    fn submit(&self, request: &InvokeRequest) -> Result<()>;
}

/// Submits by spawning the configured opener (URI payloads) or invoke
/// command (structured payloads).
pub struct SystemInvoker {
    opener_cmd: String,
    invoke_cmd: Option<String>,
}

impl SystemInvoker {
    pub fn new(opener_cmd: &str, invoke_cmd: Option<&str>) -> Self {
        Self {
            opener_cmd: opener_cmd.to_string(),
            invoke_cmd: invoke_cmd.map(|cmd| cmd.to_string()),
        }
    }
}

impl Invoker for SystemInvoker {
    fn is_available(&self) -> bool {
        binary_resolves(&self.opener_cmd)
    }

    fn submit(&self, request: &InvokeRequest) -> Result<()> {
        match &request.payload {
            InvokePayload::MailtoUri(uri) => {
                let child = Command::new(&self.opener_cmd)
                    .arg(uri)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .with_context(|| format!("failed to spawn opener '{}'", self.opener_cmd))?;
                reap_in_background(child);
                Ok(())
            }
            InvokePayload::Structured(_) => {
                let Some(invoke_cmd) = &self.invoke_cmd else {
                    bail!("structured payload requires an invoke command");
                };
                let descriptor = request.descriptor_json()?;
                let mut child = Command::new(invoke_cmd)
                    .stdin(Stdio::piped())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .with_context(|| format!("failed to spawn invoke command '{invoke_cmd}'"))?;
                if let Some(mut stdin) = child.stdin.take() {
                    stdin
                        .write_all(descriptor.as_bytes())
                        .and_then(|()| stdin.write_all(b"\n"))
                        .context("failed to write invocation descriptor")?;
                }
                reap_in_background(child);
                Ok(())
            }
        }
    }
}

/// wait() runs off-thread; submit never blocks on the handed-off process.
fn reap_in_background(mut child: std::process::Child) {
    thread::spawn(move || {
        if let Err(err) = child.wait() {
            log_debug(&format!("invocation child wait failed: {err}"));
        }
    });
}

/// Resolve a bare command name against PATH, or check an explicit path.
fn binary_resolves(cmd: &str) -> bool {
    let path = Path::new(cmd);
    if path.is_absolute() || cmd.contains(std::path::MAIN_SEPARATOR) {
        return path.is_file();
    }
    let Some(search_paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&search_paths).any(|dir: PathBuf| dir.join(cmd).is_file())
}
