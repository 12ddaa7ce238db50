use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::{engine_error, engine_info};
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::convert::{render_body, Converter, Html2MdConverter};
use crate::document::{load_document, InvalidSelector};
use crate::extract::PostExtractor;
use crate::fetch::Fetcher;
use crate::frontmatter::build_markdown_document;
use crate::persist::{discard_bundle, ensure_output_dir, AtomicFileWriter, PersistError};
use crate::settings::ConvertSettings;
use crate::types::{Post, RunReport};

/// One conversion run: every page in `input_dir` ends up under
/// `output_dir/content_type/<slug>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub content_type: String,
}

/// Errors that stop the whole run before any page is converted.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("cannot read input folder {path}: {source}")]
    InputDir { path: String, source: io::Error },
    #[error(transparent)]
    Output(#[from] PersistError),
    #[error(transparent)]
    Settings(#[from] InvalidSelector),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FileOutcome {
    Converted,
    Skipped,
    Failed,
}

pub struct Pipeline {
    settings: ConvertSettings,
    fetcher: Box<dyn Fetcher>,
    converter: Box<dyn Converter>,
    clock: Box<dyn Clock>,
}

impl Pipeline {
    pub fn new(settings: ConvertSettings, fetcher: Box<dyn Fetcher>) -> Self {
        Self {
            settings,
            fetcher,
            converter: Box::new(Html2MdConverter),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_converter(mut self, converter: Box<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    /// Converts every page of the input folder, one after the other, in file
    /// name order. Per-file problems are logged and counted; only setup
    /// problems are returned as errors.
    pub async fn run(&self, job: &ConversionJob) -> Result<RunReport, SetupError> {
        self.settings.validate()?;

        let mut entries = fs::read_dir(&job.input_dir)
            .and_then(|dir| dir.collect::<Result<Vec<_>, io::Error>>())
            .map_err(|source| SetupError::InputDir {
                path: job.input_dir.display().to_string(),
                source,
            })?;
        entries.sort_by_key(|entry| entry.file_name());

        ensure_output_dir(&job.output_dir)?;
        let content_root = job.output_dir.join(&job.content_type);
        ensure_output_dir(&content_root)?;

        let mut report = RunReport {
            found: entries.len(),
            ..RunReport::default()
        };
        engine_info!(
            "Found {} entries in {}",
            report.found,
            job.input_dir.display()
        );

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_dir() || !name.ends_with(&self.settings.input_extension) {
                engine_info!("Ignoring (ext) {name}");
                report.skipped += 1;
                continue;
            }

            match self
                .convert_file(&path, &name, &content_root, &job.content_type)
                .await
            {
                FileOutcome::Converted => report.converted += 1,
                FileOutcome::Skipped => report.skipped += 1,
                FileOutcome::Failed => report.failed += 1,
            }
        }

        Ok(report)
    }

    async fn convert_file(
        &self,
        path: &Path,
        name: &str,
        content_root: &Path,
        content_type: &str,
    ) -> FileOutcome {
        let mut doc = match load_document(path, &self.settings) {
            Ok(doc) => doc,
            Err(err) => {
                engine_error!("Error reading {name}: {err}");
                return FileOutcome::Failed;
            }
        };

        let extractor = PostExtractor {
            settings: &self.settings,
            fetcher: self.fetcher.as_ref(),
            clock: self.clock.as_ref(),
            content_root,
            content_type,
        };
        let mut post = Post::default();
        if let Err(err) = extractor.extract(&mut doc, &mut post).await {
            engine_error!("Error processing {name}: {err}");
            discard_bundle(&post.hdd_folder);
            return FileOutcome::Failed;
        }

        if !post.draft && post.is_comment {
            engine_info!("Ignoring (comment) {name}");
            discard_bundle(&post.hdd_folder);
            return FileOutcome::Skipped;
        }

        engine_info!("Processing {name} => {}", post.hdd_folder.display());
        post.body = match render_body(&doc, &self.settings.body_selector, self.converter.as_ref())
        {
            Ok(body) => body,
            Err(err) => {
                engine_error!("Error rendering {name}: {err}");
                discard_bundle(&post.hdd_folder);
                return FileOutcome::Failed;
            }
        };
        if post.title.is_empty() || post.body.is_empty() {
            engine_info!("Ignoring (empty) {name}");
            discard_bundle(&post.hdd_folder);
            return FileOutcome::Skipped;
        }

        let writer = AtomicFileWriter::new(post.hdd_folder.clone());
        match writer.write(&post.markdown_file_name(), &build_markdown_document(&post)) {
            Ok(written) => {
                engine_info!("Wrote {}", written.display());
                FileOutcome::Converted
            }
            Err(err) => {
                engine_error!("Error writing {name}: {err}");
                discard_bundle(&post.hdd_folder);
                FileOutcome::Failed
            }
        }
    }
}
