//! Optional RON settings file.
//!
//! Every field is optional; missing ones keep the defaults that match the
//! archive export:
//!
//! ```ron
//! (
//!     convert: (body_selector: "div.message-body", input_charset: Some("utf-8")),
//!     fetch: (request_timeout: Some((secs: 30, nanos: 0))),
//! )
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use newsletter_engine::{ConvertSettings, FetchSettings};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub convert: ConvertSettings,
    pub fetch: FetchSettings,
}

pub fn load(path: &Path) -> anyhow::Result<SettingsFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    let settings: SettingsFile = ron::from_str(&content)
        .with_context(|| format!("parsing settings file {}", path.display()))?;
    Ok(settings)
}
