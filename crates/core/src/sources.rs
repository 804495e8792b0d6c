//! Loading source documents.
//!
//! [`SourceSet`] is the ordered collection of inputs for a merge. Order
//! decides each file's source index, and with it merge precedence and the
//! order of conflict options. Adding a file whose identifier is already
//! present replaces its text but keeps its position.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::errors::SourceError;
use crate::models::SourceFile;

impl SourceFile {
    /// Read a UTF-8 source document from disk.
    ///
    /// The identifier is the canonical path when it can be resolved; the
    /// display name is the file name.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
            _ => SourceError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        let raw_text =
            String::from_utf8(bytes).map_err(|_| SourceError::NotUtf8(path.to_path_buf()))?;

        let identifier = std::fs::canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| identifier.clone());

        debug!(path = %path.display(), bytes = raw_text.len(), "loaded source file");
        Ok(Self {
            identifier,
            display_name,
            raw_text,
        })
    }
}

/// Ordered, identifier-unique collection of source files.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    files: Vec<SourceFile>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `file`, or replace the text of the file with the same identifier.
    /// Returns `true` when the file was new.
    pub fn add(&mut self, file: SourceFile) -> bool {
        match self
            .files
            .iter_mut()
            .find(|f| f.identifier == file.identifier)
        {
            Some(existing) => {
                debug!(identifier = %file.identifier, "replacing source file");
                *existing = file;
                false
            }
            None => {
                self.files.push(file);
                true
            }
        }
    }

    /// Load and add each path. Files that fail to load are skipped and
    /// their errors returned as warnings.
    pub fn load_paths<I, P>(&mut self, paths: I) -> Vec<SourceError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut warnings = Vec::new();
        for path in paths {
            match SourceFile::load(path) {
                Ok(file) => {
                    self.add(file);
                }
                Err(e) => {
                    warn!(error = %e, "skipping source file");
                    warnings.push(e);
                }
            }
        }
        info!(
            loaded = self.files.len(),
            skipped = warnings.len(),
            "source files loaded"
        );
        warnings
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn into_files(self) -> Vec<SourceFile> {
        self.files
    }
}
