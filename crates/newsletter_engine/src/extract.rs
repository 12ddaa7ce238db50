use std::any::Any;
use std::fs;
use std::io;
use std::panic::AssertUnwindSafe;
use std::path::Path;

use engine_logging::{engine_debug, engine_error};
use futures_util::FutureExt;
use scraper::Html;
use thiserror::Error;

use crate::clock::Clock;
use crate::dates::format_publish_date;
use crate::document::{selector, InvalidSelector};
use crate::fetch::Fetcher;
use crate::images::{relocate_images, ImageTarget};
use crate::settings::ConvertSettings;
use crate::slug::{fallback_slug, slugify};
use crate::types::Post;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Selector(#[from] InvalidSelector),
    #[error("cannot create post folder {path}: {source}")]
    BundleFolder { path: String, source: io::Error },
    #[error("extraction panicked: {0}")]
    Panicked(String),
}

/// Fills a [`Post`] from a cleaned document and prepares its bundle folder.
pub struct PostExtractor<'a> {
    pub settings: &'a ConvertSettings,
    pub fetcher: &'a dyn Fetcher,
    pub clock: &'a dyn Clock,
    /// `<output>/<content_type>`
    pub content_root: &'a Path,
    pub content_type: &'a str,
}

impl PostExtractor<'_> {
    /// Populates `post` in place so that, on failure, whatever bundle folder
    /// was already assigned can still be cleaned up by the caller.
    ///
    /// Image `src` attributes in `doc` are rewritten to their relocated URLs,
    /// so the body must be rendered after this returns.
    pub async fn extract(&self, doc: &mut Html, post: &mut Post) -> Result<(), ExtractError> {
        match AssertUnwindSafe(self.extract_inner(doc, post))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(ExtractError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    async fn extract_inner(&self, doc: &mut Html, post: &mut Post) -> Result<(), ExtractError> {
        post.lastmod = self.clock.lastmod();
        post.title = select_text(doc, &self.settings.title_selector)?.replace('"', "");
        let raw_date = select_text(doc, &self.settings.date_selector)?;
        post.date = format_publish_date(&raw_date);
        let byline = select_text(doc, &self.settings.byline_selector)?;
        post.author = byline
            .strip_prefix("by ")
            .unwrap_or(&byline)
            .trim()
            .replace('"', "");

        post.subtitle.clear();
        post.description.clear();
        post.canonical.clear();
        post.tags.clear();
        post.draft = false;
        post.is_comment = false;

        let mut slug = slugify(&post.title);
        if slug.is_empty() {
            slug = fallback_slug(&post.date);
        }
        post.hdd_folder = self.content_root.join(&slug);
        post.slug = slug;
        prepare_bundle_dir(&post.hdd_folder)?;

        let target = ImageTarget {
            bundle_dir: &post.hdd_folder,
            content_type: self.content_type,
            slug: &post.slug,
            featured_attribute: &self.settings.featured_attribute,
        };
        match relocate_images(doc, &target, self.fetcher).await {
            Ok(relocated) => {
                post.images = relocated.urls;
                post.featured_image = relocated.featured.unwrap_or_default();
            }
            Err(err) => engine_error!("Images for {:?}: {}", post.title, err),
        }

        if post.featured_image.is_empty() {
            if let Some(first) = post.images.first() {
                post.featured_image = first.clone();
            }
        }
        engine_debug!(
            "Extracted {:?} with {} image(s)",
            post.title,
            post.images.len()
        );
        Ok(())
    }
}

/// Deletes whatever sits at `dir` and creates it empty.
fn prepare_bundle_dir(dir: &Path) -> Result<(), ExtractError> {
    let to_error = |source| ExtractError::BundleFolder {
        path: dir.display().to_string(),
        source,
    };
    match fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(dir).map_err(to_error)?,
        Ok(_) => fs::remove_file(dir).map_err(to_error)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(to_error(err)),
    }
    fs::create_dir(dir).map_err(to_error)
}

fn select_text(doc: &Html, css: &str) -> Result<String, InvalidSelector> {
    let sel = selector(css)?;
    Ok(doc
        .select(&sel)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
