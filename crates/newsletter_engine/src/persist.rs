use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{path} exists but is not a folder")]
    NotAFolder { path: String },
    #[error("cannot prepare folder {path}: {source}")]
    Folder { path: String, source: io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: String, source: io::Error },
}

/// Makes sure a content folder (the Hugo output root or `<root>/<type>`)
/// exists and accepts new files.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let folder_error = |source| PersistError::Folder {
        path: dir.display().to_string(),
        source,
    };
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            return Err(PersistError::NotAFolder {
                path: dir.display().to_string(),
            })
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(folder_error)?;
        }
        Err(err) => return Err(folder_error(err)),
    }
    // Read-only folders are reported before any bundle is created.
    NamedTempFile::new_in(dir).map_err(folder_error)?;
    Ok(())
}

/// Removes a post bundle (Markdown file and `images/`) that will not be
/// published. An unassigned bundle path is left alone.
pub fn discard_bundle(bundle_dir: &Path) {
    if bundle_dir.as_os_str().is_empty() {
        return;
    }
    let _ = fs::remove_dir_all(bundle_dir);
}

/// Writes the Markdown file of a post into its bundle folder.
///
/// Hugo never sees a half-written post: the text goes to a temporary file
/// inside the bundle which is then renamed over the final name.
pub struct AtomicFileWriter {
    bundle_dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(bundle_dir: PathBuf) -> Self {
        Self { bundle_dir }
    }

    /// Writes `markdown` to `<bundle>/<file_name>` and returns the final path.
    /// Whatever already sits at that path, file or folder, is replaced.
    pub fn write(&self, file_name: &str, markdown: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.bundle_dir)?;

        let target = self.bundle_dir.join(file_name);
        let write_error = |source| PersistError::Write {
            path: target.display().to_string(),
            source,
        };

        let mut staged = NamedTempFile::new_in(&self.bundle_dir).map_err(write_error)?;
        staged
            .write_all(markdown.as_bytes())
            .and_then(|()| staged.as_file_mut().sync_all())
            .map_err(write_error)?;

        match fs::symlink_metadata(&target) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&target).map_err(write_error)?,
            Ok(_) => fs::remove_file(&target).map_err(write_error)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(write_error(err)),
        }
        staged
            .persist(&target)
            .map_err(|err| write_error(err.error))?;
        Ok(target)
    }
}
