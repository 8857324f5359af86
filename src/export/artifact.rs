//! Project artifact serialization
//!
//! The artifact is one JSON document:
//! `version`, `package_name`, `description`, `player`, `src.{image,audio,text}[]`
//! (each `{id, name, data}`) and `playlist[]`.

use crate::error::ArtifactError;
use crate::model::Document;
use serde_json::Value;

/// Major format version this build can read
const SUPPORTED_MAJOR: u64 = 1;

/// Serialize a document to the pretty-printed artifact text
pub fn export(document: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

/// Serialize a document to single-line artifact text
pub fn export_compact(document: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string(document)
}

/// Parse artifact text back into a document, ids preserved.
///
/// Display handles for media are not part of the artifact; decode pool
/// entries with [`crate::codec::decode`] after loading.
pub fn import(artifact: &str) -> Result<Document, ArtifactError> {
    let value: Value = serde_json::from_str(artifact).map_err(ArtifactError::Parse)?;

    let object = value
        .as_object()
        .ok_or_else(|| ArtifactError::Schema("artifact root must be an object".to_string()))?;
    let version = match object.get("version") {
        Some(Value::String(v)) => v.as_str(),
        Some(_) => return Err(ArtifactError::Schema("`version` must be a string".to_string())),
        None => return Err(ArtifactError::Schema("missing `version`".to_string())),
    };
    check_version(version)?;

    let document: Document =
        serde_json::from_value(value).map_err(|e| ArtifactError::Schema(e.to_string()))?;
    document.validate()?;

    log::debug!(
        "Imported {:?}: {} slide(s), {} image(s), {} audio, {} caption(s)",
        document.package_name(),
        document.playlist().len(),
        document.src().image.len(),
        document.src().audio.len(),
        document.src().text.len()
    );
    Ok(document)
}

/// Accept any `1.x.y` semantic version, with optional pre-release or build suffix
fn check_version(version: &str) -> Result<(), ArtifactError> {
    let core = version
        .trim()
        .split(['-', '+'])
        .next()
        .unwrap_or_default();
    let parts: Vec<&str> = core.split('.').collect();
    let numbers: Option<Vec<u64>> = parts.iter().map(|p| p.parse().ok()).collect();
    let major = match numbers.as_deref() {
        Some([major, _minor, _patch]) => *major,
        _ => {
            return Err(ArtifactError::Schema(format!(
                "unparseable version {:?}",
                version
            )))
        }
    };

    if major != SUPPORTED_MAJOR {
        return Err(ArtifactError::Schema(format!(
            "unsupported version {} (expected {}.x.y)",
            version, SUPPORTED_MAJOR
        )));
    }
    Ok(())
}
