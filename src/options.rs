//! Compose options decoded from the `open` command's JSON argument.

use serde::Deserialize;

/// Result payload emitted to the caller when the options document cannot be
/// decoded.
pub const PARSE_ERROR_RESULT: &str = "Cannot parse JSON object";

/// Email fields supplied by the caller.
///
/// Missing keys decode to empty lists or `None`; unknown keys are ignored.
/// List order is preserved exactly as given, the composer decides how to
/// display duplicates or oddly shaped addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmailOptions {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub attachments: Vec<String>,
}

/// Decode one options document. The dispatcher converts a failure into an
/// asynchronous parse-error event; nothing here panics.
pub fn parse_options(raw: &str) -> Result<EmailOptions, serde_json::Error> {
    serde_json::from_str(raw)
}
