//! Destination resolution and artifact writing.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ZeusError;

/// Directory and filename an artifact is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDestination {
    pub directory: PathBuf,
    pub filename: String,
}

impl OutputDestination {
    /// Resolve a user-supplied path that names either a directory or a file.
    ///
    /// The path names a file when it ends with one of `extensions` (a literal
    /// suffix test); otherwise `default_filename` is placed inside it.
    pub fn resolve(path: &Path, extensions: &[&str], default_filename: &str) -> Self {
        let raw = path.to_string_lossy();
        let names_file = extensions.iter().any(|ext| raw.ends_with(ext));

        if names_file && let Some(filename) = path.file_name() {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            return Self {
                directory,
                filename: filename.to_string_lossy().into_owned(),
            };
        }

        Self {
            directory: path.to_path_buf(),
            filename: default_filename.to_string(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Create `directory` and any missing ancestors, then create or overwrite
/// `directory/filename` with `content`. Returns the written path.
pub async fn write_artifact(
    directory: &Path,
    filename: &str,
    content: &str,
) -> Result<PathBuf, ZeusError> {
    let path = directory.join(filename);

    tokio::fs::create_dir_all(directory)
        .await
        .map_err(|source| ZeusError::ArtifactWriteFailed {
            path: directory.to_path_buf(),
            source,
        })?;

    tokio::fs::write(&path, content)
        .await
        .map_err(|source| ZeusError::ArtifactWriteFailed {
            path: path.clone(),
            source,
        })?;

    debug!(path = %path.display(), len = content.len(), "Wrote artifact.");
    Ok(path)
}
