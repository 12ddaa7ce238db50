//! Newsletter engine: turns exported archive pages into static-site page bundles.
mod clock;
mod convert;
mod dates;
mod decode;
mod document;
mod extract;
mod fetch;
mod frontmatter;
mod images;
mod persist;
mod pipeline;
mod settings;
mod slug;
mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use convert::{render_body, Converter, Html2MdConverter};
pub use dates::{format_publish_date, parse_publish_date, DATE_FORMAT};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use document::{clean_document, load_document, InvalidSelector, LoadError};
pub use extract::{ExtractError, PostExtractor};
pub use fetch::{Fetcher, ReqwestFetcher};
pub use frontmatter::build_markdown_document;
pub use images::{relocate_images, ImageTarget, RelocateError, RelocatedImages};
pub use persist::{discard_bundle, ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{ConversionJob, Pipeline, SetupError};
pub use settings::{ConvertSettings, FetchSettings};
pub use slug::{fallback_slug, slugify};
pub use types::{FailureKind, FetchError, Post, RunReport};
