//! Writing the merged document.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::OutputError;

/// File name suggested for the merged result when none is configured.
pub const DEFAULT_OUTPUT_NAME: &str = "merged_engine.ini";

/// Write `text` to `path` as UTF-8 and return the path written.
///
/// On failure the caller still holds `text` and may retry elsewhere.
pub fn write_merged<P: AsRef<Path>>(path: P, text: &str) -> Result<PathBuf, OutputError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(OutputError::EmptyPath);
    }
    std::fs::write(path, text).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = text.len(), "merged file written");
    Ok(path.to_path_buf())
}
