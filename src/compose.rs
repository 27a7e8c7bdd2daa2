//! Translation from compose options to the platform payload: either a flat
//! `mailto:` string or a structured map for the invocation service. Both
//! builders are pure; the same options always produce the same bytes.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;

use crate::options::EmailOptions;

/// Bytes percent-encoded when an attachment path is rewritten as a file URI.
const FILE_URI_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}');

/// Structured compose payload handed to the invocation service in place of a
/// flat URI. Attachments arrive re-encoded as file URIs under `attachment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeData {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub attachment: Vec<String>,
}

/// Render the options as a `mailto:` string.
///
/// Segment order and separators are fixed: recipients, then `?cc=`, `&bcc=`,
/// `&subject=`, `&body=`, `&attachment=`. The query section only ever opens
/// at `cc`; every later segment uses `&` even when `cc` is absent, so a
/// cc-less request with a bcc yields `...&bcc=...` with no `?` at all.
/// Interoperating callers consume these exact bytes. Subject and body are
/// passed through raw; any percent-encoding is the consumer's business.
pub fn build_mailto(options: &EmailOptions) -> String {
    let mut uri = format!("mailto:{}", options.to.join(","));

    if !options.cc.is_empty() {
        uri.push_str("?cc=");
        uri.push_str(&options.cc.join(","));
    }
    if !options.bcc.is_empty() {
        uri.push_str("&bcc=");
        uri.push_str(&options.bcc.join(","));
    }
    if let Some(subject) = &options.subject {
        uri.push_str("&subject=");
        uri.push_str(subject);
    }
    if let Some(body) = &options.body {
        uri.push_str("&body=");
        uri.push_str(body);
    }
    if !options.attachments.is_empty() {
        uri.push_str("&attachment=");
        uri.push_str(&options.attachments.join(","));
    }

    uri
}

/// Build the structured payload, rewriting attachment paths as file URIs.
pub fn build_compose_data(options: &EmailOptions) -> ComposeData {
    ComposeData {
        to: options.to.clone(),
        cc: options.cc.clone(),
        bcc: options.bcc.clone(),
        subject: options.subject.clone(),
        body: options.body.clone(),
        attachment: options.attachments.iter().map(|path| file_uri(path)).collect(),
    }
}

/// Percent-encode a path and prefix `file://` unless it already carries a
/// scheme.
fn file_uri(path: &str) -> String {
    let encoded = utf8_percent_encode(path, FILE_URI_SET).to_string();
    if path.contains("://") {
        encoded
    } else {
        format!("file://{encoded}")
    }
}
