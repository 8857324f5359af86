//! Round-trip validation of a saved project

use crate::codec;
use crate::export::artifact;
use crate::model::{Document, PoolKind};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Summary of a validated artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub slides: usize,
    pub images: usize,
    pub audio: usize,
    pub captions: usize,
    /// Decoded media bytes across image and audio pools
    pub media_bytes: usize,
    /// Pool entries no slide refers to
    pub unreferenced: usize,
}

/// Validate an artifact file
///
/// Parses it, checks reference integrity, decodes every media payload, then
/// re-exports and re-imports to confirm nothing is lost.
pub fn validate_artifact(path: &Path) -> Result<ValidationReport> {
    log::info!("Validating project at: {:?}", path);

    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    log::info!("Artifact size: {} bytes", text.len());

    let document = artifact::import(&text).context("Artifact failed to load")?;
    log::info!("✅ Artifact parsed, version {}", document.version());

    let mut media_bytes = 0;
    for kind in [PoolKind::Image, PoolKind::Audio] {
        for entry in document.src().pool(kind).iter() {
            let decoded = codec::decode(&entry.payload)
                .with_context(|| format!("Failed to decode {} entry {:?}", kind, entry.name))?;
            log::debug!(
                "  {} {:?}: {} ({} bytes)",
                kind,
                entry.name,
                decoded.mime_type,
                decoded.byte_length
            );
            media_bytes += decoded.byte_length;
        }
    }

    let reexported = artifact::export(&document).context("Failed to re-export")?;
    let reloaded = artifact::import(&reexported).context("Re-exported artifact failed to load")?;
    if reloaded != document {
        anyhow::bail!("Round-trip mismatch: re-imported project differs from the original");
    }
    log::info!("✅ Round-trip preserved every field");

    let report = ValidationReport {
        slides: document.playlist().len(),
        images: document.src().image.len(),
        audio: document.src().audio.len(),
        captions: document.src().text.len(),
        media_bytes,
        unreferenced: count_unreferenced(&document),
    };

    log::info!("Project {:?}:", document.package_name());
    log::info!("  - Slides: {}", report.slides);
    log::info!(
        "  - Pools: {} image, {} audio, {} text",
        report.images,
        report.audio,
        report.captions
    );
    log::info!("  - Media: {} bytes", report.media_bytes);
    if report.unreferenced > 0 {
        log::warn!(
            "  - {} pool entr{} not bound to any slide",
            report.unreferenced,
            if report.unreferenced == 1 { "y" } else { "ies" }
        );
    }

    Ok(report)
}

fn count_unreferenced(document: &Document) -> usize {
    let pruned = document.pruned();
    PoolKind::ALL
        .iter()
        .map(|&kind| document.src().pool(kind).len() - pruned.src().pool(kind).len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaFile;
    use tempfile::TempDir;

    #[test]
    fn test_validate_saved_project() {
        let dir = TempDir::new().unwrap();
        let mut doc = Document::create("Valid", "");
        doc.import_images(&[
            MediaFile::new("a.png", "image/png", vec![1, 2, 3]),
            MediaFile::new("b.png", "image/png", vec![4]),
        ]);
        doc.import_audio(&[MediaFile::new("x.mp3", "audio/mpeg", vec![5; 10])]);
        doc.set_caption(0, "Caption").unwrap();

        let path = dir.path().join("config.json");
        fs::write(&path, artifact::export(&doc).unwrap()).unwrap();

        let report = validate_artifact(&path).unwrap();
        assert_eq!(report.slides, 2);
        assert_eq!(report.images, 2);
        assert_eq!(report.audio, 1);
        assert_eq!(report.captions, 1);
        assert_eq!(report.media_bytes, 14);
        assert_eq!(report.unreferenced, 1);
    }

    #[test]
    fn test_validate_rejects_corrupt_payload() {
        let dir = TempDir::new().unwrap();
        let mut doc = Document::create("Broken", "");
        doc.import_images(&[MediaFile::new("a.png", "image/png", vec![1, 2, 3])]);
        let text = artifact::export(&doc)
            .unwrap()
            .replace("data:image/png;base64,", "image/png;base64,");

        let path = dir.path().join("broken.json");
        fs::write(&path, text).unwrap();

        assert!(validate_artifact(&path).is_err());
    }
}
