use std::time::Duration;

use serde::Deserialize;

use crate::document::{selector, InvalidSelector};

/// Describes the shape of an exported archive page.
///
/// The defaults match the observed newsletter export; every field can be
/// overridden from a settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConvertSettings {
    /// File name suffix of the pages to convert.
    pub input_extension: String,
    /// Charset to decode pages with. Detected when unset.
    pub input_charset: Option<String>,
    pub title_selector: String,
    pub byline_selector: String,
    pub date_selector: String,
    pub body_selector: String,
    /// Elements removed before rendering (the export repeats the title).
    pub heading_selector: String,
    /// Attribute marking the post's featured image.
    pub featured_attribute: String,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            input_extension: ".html".to_string(),
            input_charset: None,
            title_selector: "title".to_string(),
            byline_selector: "div.by-line".to_string(),
            date_selector: "div.date".to_string(),
            body_selector: "div.message-body".to_string(),
            heading_selector: "h1".to_string(),
            featured_attribute: "data-is-featured".to_string(),
        }
    }
}

/// HTTP settings for image downloads. No timeout is applied unless one is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl ConvertSettings {
    /// Parses every selector; the pipeline calls this before reading any page.
    pub fn validate(&self) -> Result<(), InvalidSelector> {
        for css in [
            &self.title_selector,
            &self.byline_selector,
            &self.date_selector,
            &self.body_selector,
            &self.heading_selector,
        ] {
            selector(css)?;
        }
        Ok(())
    }
}
