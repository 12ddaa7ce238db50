use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ego_tree::NodeId;
use engine_logging::{engine_error, engine_info, engine_warn};
use scraper::node::Node;
use scraper::{Html, Selector};
use thiserror::Error;

use crate::fetch::Fetcher;

#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("cannot create images folder {path}: {source}")]
    ImagesFolder { path: String, source: io::Error },
}

/// Images moved into a post bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocatedImages {
    /// Public URLs in document order.
    pub urls: Vec<String>,
    pub featured: Option<String>,
}

/// Where relocated images go on disk and under which public path they are
/// served.
#[derive(Debug, Clone)]
pub struct ImageTarget<'a> {
    pub bundle_dir: &'a Path,
    pub content_type: &'a str,
    pub slug: &'a str,
    pub featured_attribute: &'a str,
}

struct ImageRef {
    id: NodeId,
    index: usize,
    src: Option<String>,
    featured: bool,
}

/// Downloads every `<img>` into `<bundle>/images/<n>.<ext>` and points its
/// `src` at `/<content_type>/<slug>/images/<n>.<ext>`.
///
/// `n` counts `<img>` elements from 1 in document order. A failed image is
/// logged and left out; only a missing images folder is an error.
pub async fn relocate_images(
    doc: &mut Html,
    target: &ImageTarget<'_>,
    fetcher: &dyn Fetcher,
) -> Result<RelocatedImages, RelocateError> {
    let images = collect_images(doc, target.featured_attribute);
    let mut relocated = RelocatedImages::default();
    if images.is_empty() {
        return Ok(relocated);
    }

    let images_dir = target.bundle_dir.join("images");
    fs::create_dir_all(&images_dir).map_err(|source| RelocateError::ImagesFolder {
        path: images_dir.display().to_string(),
        source,
    })?;

    for image in images {
        let Some(original) = image.src else {
            engine_warn!("Image {} has no src, skipping", image.index);
            continue;
        };
        let Some(ext) = extension_of(&original) else {
            engine_error!("Image {original} has no usable extension, skipping");
            continue;
        };

        let filename = format!("{}.{}", image.index, ext);
        let disk_path: PathBuf = images_dir.join(&filename);
        if let Err(err) = fetcher.download(&original, &disk_path).await {
            engine_error!("Image {original} failed: {err}");
            let _ = fs::remove_file(&disk_path);
            continue;
        }

        let url = format!(
            "/{}/{}/images/{}",
            target.content_type, target.slug, filename
        );
        set_image_src(doc, image.id, &url);
        engine_info!("Saved image {} => {}", original, disk_path.display());

        if image.featured {
            relocated.featured = Some(url.clone());
        }
        relocated.urls.push(url);
    }

    Ok(relocated)
}

fn collect_images(doc: &Html, featured_attribute: &str) -> Vec<ImageRef> {
    let Ok(img) = Selector::parse("img") else {
        return Vec::new();
    };
    doc.select(&img)
        .enumerate()
        .map(|(i, el)| ImageRef {
            id: el.id(),
            index: i + 1,
            src: el.value().attr("src").map(str::to_string),
            featured: el.value().attr(featured_attribute).is_some(),
        })
        .collect()
}

/// Text after the last `.` of the source URL.
fn extension_of(src: &str) -> Option<&str> {
    let (_, ext) = src.rsplit_once('.')?;
    if ext.is_empty() || ext.contains(['/', '\\']) {
        return None;
    }
    Some(ext)
}

/// Replaces the `<img>` node with a copy whose `src` is `new_src`.
fn set_image_src(doc: &mut Html, id: NodeId, new_src: &str) {
    let Some(replacement) = rebuilt_image(doc, id, new_src) else {
        return;
    };
    if let Some(mut node) = doc.tree.get_mut(id) {
        node.insert_before(replacement);
        node.detach();
    }
}

fn rebuilt_image(doc: &Html, id: NodeId, new_src: &str) -> Option<Node> {
    let node = doc.tree.get(id)?;
    let Node::Element(element) = node.value() else {
        return None;
    };

    let mut tag = String::from("<img");
    for (name, value) in element.attrs() {
        let value = if name == "src" { new_src } else { value };
        tag.push(' ');
        tag.push_str(name);
        tag.push_str("=\"");
        tag.push_str(&html_escape::encode_double_quoted_attribute(value));
        tag.push('"');
    }
    tag.push('>');

    let fragment = Html::parse_fragment(&tag);
    let img = Selector::parse("img").ok()?;
    let rebuilt = fragment.select(&img).next()?;
    Some(Node::Element(rebuilt.value().clone()))
}
