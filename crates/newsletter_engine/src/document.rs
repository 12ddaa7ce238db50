use std::fs;
use std::io;
use std::path::Path;

use scraper::{Html, Selector};
use thiserror::Error;

use crate::decode::{decode_html, DecodeError};
use crate::settings::ConvertSettings;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("cannot decode {path}: {source}")]
    Decode { path: String, source: DecodeError },
    #[error(transparent)]
    Selector(#[from] InvalidSelector),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid selector {css:?}: {message}")]
pub struct InvalidSelector {
    pub css: String,
    pub message: String,
}

pub(crate) fn selector(css: &str) -> Result<Selector, InvalidSelector> {
    Selector::parse(css).map_err(|err| InvalidSelector {
        css: css.to_string(),
        message: err.to_string(),
    })
}

/// Reads and parses one exported page, then strips the repeated headings.
pub fn load_document(path: &Path, settings: &ConvertSettings) -> Result<Html, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let decoded =
        decode_html(&bytes, settings.input_charset.as_deref()).map_err(|source| {
            LoadError::Decode {
                path: path.display().to_string(),
                source,
            }
        })?;

    let mut doc = Html::parse_document(&decoded.html);
    clean_document(&mut doc, settings)?;
    Ok(doc)
}

/// Removes every element matching the heading selector; returns how many
/// were detached.
pub fn clean_document(doc: &mut Html, settings: &ConvertSettings) -> Result<usize, InvalidSelector> {
    let headings = selector(&settings.heading_selector)?;
    let ids: Vec<_> = doc.select(&headings).map(|el| el.id()).collect();
    for id in &ids {
        if let Some(mut node) = doc.tree.get_mut(*id) {
            node.detach();
        }
    }
    Ok(ids.len())
}
