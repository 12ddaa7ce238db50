use std::fmt;
use std::path::PathBuf;

/// One converted archive page.
///
/// Subtitle, description, canonical, full URL and tags are never filled from
/// the export; they stay on the record so templates keep the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub author: String,
    pub body: String,
    pub date: String,
    pub lastmod: String,
    pub subtitle: String,
    pub description: String,
    pub canonical: String,
    pub full_url: String,
    pub featured_image: String,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    /// Bundle folder holding the Markdown file and its `images/`.
    pub hdd_folder: PathBuf,
    pub slug: String,
    pub draft: bool,
    // Nothing in the export marks comments yet, so this is always false.
    pub is_comment: bool,
}

impl Post {
    /// Name of the Markdown file inside the bundle folder.
    pub fn markdown_file_name(&self) -> String {
        format!("{}.md", self.slug)
    }
}

/// Counters for one pass over the input folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub found: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
