//! Folder scanning

use super::MediaFile;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Read every regular file under `dir`, sorted by relative path.
///
/// The MIME type is guessed from the extension. Unreadable files are skipped
/// with a warning so one bad entry does not abort the folder.
pub fn scan_folder(dir: &Path) -> Result<Vec<MediaFile>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {:?}", dir);
    }

    log::info!("Scanning folder {:?}", dir);

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", dir))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let name = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let byte_size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                log::warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        log::debug!("Found {} ({}, {} bytes)", name, mime_type, byte_size);
        files.push(MediaFile {
            name,
            mime_type,
            byte_size,
            bytes,
        });
    }

    log::info!("Found {} file(s) in {:?}", files.len(), dir);
    Ok(files)
}
