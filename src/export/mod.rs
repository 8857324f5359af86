//! Project import/export
//!
//! [`artifact`] holds the pure text conversion; [`Exporter`] and
//! [`read_artifact`] add the file handling around it.

pub mod artifact;
pub mod config;

pub use artifact::{export, import};
pub use config::{ExportConfig, DEFAULT_FILE_NAME};

use crate::model::Document;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes documents to disk according to an [`ExportConfig`]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Serialize `document` and write it, returning the artifact path
    pub fn export(&self, document: &Document) -> Result<PathBuf> {
        let path = self.config.artifact_path();
        if !self.config.overwrite && path.exists() {
            anyhow::bail!("{:?} already exists", path);
        }
        log::info!("Exporting {:?} to {:?}", document.package_name(), path);

        let pruned;
        let document = if self.config.prune_unreferenced {
            pruned = document.pruned();
            log::info!(
                "Pruned unreferenced entries: {} -> {} image, {} -> {} audio, {} -> {} text",
                document.src().image.len(),
                pruned.src().image.len(),
                document.src().audio.len(),
                pruned.src().audio.len(),
                document.src().text.len(),
                pruned.src().text.len()
            );
            &pruned
        } else {
            document
        };

        let text = if self.config.compact {
            artifact::export_compact(document)
        } else {
            artifact::export(document)
        }
        .context("Failed to serialize project")?;

        if !self.config.output_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.config.output_dir).with_context(|| {
                format!("Failed to create output directory {:?}", self.config.output_dir)
            })?;
        }
        write_replacing(&path, text.as_bytes())?;

        log::info!(
            "Wrote {} slide(s) to {:?}",
            document.playlist().len(),
            path
        );
        Ok(path)
    }
}

/// Write to a sibling staging file, then rename it over `path`
fn write_replacing(path: &Path, contents: &[u8]) -> Result<()> {
    let mut staging_name = path.file_name().unwrap_or_default().to_os_string();
    staging_name.push(".tmp");
    let staging = path.with_file_name(staging_name);

    fs::write(&staging, contents).with_context(|| format!("Failed to write {:?}", staging))?;
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err::<(), _>(e).with_context(|| format!("Failed to replace {:?}", path));
    }
    Ok(())
}

/// Load a project artifact from any file name
pub fn read_artifact(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read project file {:?}", path))?;
    let document = artifact::import(&text)
        .with_context(|| format!("Could not open project {:?}", path))?;
    log::info!(
        "Opened {:?}: {} slide(s)",
        document.package_name(),
        document.playlist().len()
    );
    Ok(document)
}
