use scraper::Html;

use crate::document::{selector, InvalidSelector};

pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl Converter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> String {
        html2md::parse_html(html)
    }
}

/// Converts every message-body element to Markdown, in document order.
///
/// Sections are separated by a blank line, non-breaking spaces become plain
/// spaces and the result is trimmed. No body yields an empty string.
pub fn render_body(
    doc: &Html,
    body_selector: &str,
    converter: &dyn Converter,
) -> Result<String, InvalidSelector> {
    let sel = selector(body_selector)?;
    let sections: Vec<String> = doc
        .select(&sel)
        .map(|body| converter.to_markdown(body.inner_html().trim()))
        .map(|md| md.trim().to_string())
        .filter(|md| !md.is_empty())
        .collect();

    Ok(sections.join("\n\n").replace('\u{a0}', " ").trim().to_string())
}
