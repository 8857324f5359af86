//! Export configuration

use std::path::{Path, PathBuf};

/// File name offered when saving a playlist
pub const DEFAULT_FILE_NAME: &str = "config.json";

/// Configuration for writing a project artifact
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory the artifact is written to
    pub output_dir: PathBuf,

    /// Artifact file name inside `output_dir`
    pub file_name: String,

    /// Drop pool entries no slide refers to
    pub prune_unreferenced: bool,

    /// Single-line JSON instead of pretty-printed
    pub compact: bool,

    /// Replace an artifact that already exists at the target path
    pub overwrite: bool,
}

impl ExportConfig {
    /// Create a new export configuration
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            file_name: DEFAULT_FILE_NAME.to_string(),
            prune_unreferenced: false,
            compact: false,
            overwrite: true,
        }
    }

    /// Split a full artifact path into directory and file name
    pub fn for_path(path: &Path) -> Self {
        let output_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let config = Self::new(output_dir);
        match path.file_name() {
            Some(name) => config.with_file_name(name.to_string_lossy()),
            None => config,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune_unreferenced = prune;
        self
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Full path of the artifact
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }
}
