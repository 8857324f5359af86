//! Error types shared across the crate
//!
//! Lookups that miss are not errors: they return `None` and callers treat
//! the slot as unbound.

use crate::model::PoolKind;
use thiserror::Error;
use uuid::Uuid;

/// Failure to decode an embedded payload
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encoded payload does not start with a `data:` prefix")]
    MissingPrefix,

    #[error("encoded payload has no `;base64,` marker")]
    MissingBase64Marker,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Rejected mutation or broken invariant on a document
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A slide mutation points at an id missing from its pool
    #[error("{kind} id {id} does not exist in the {kind} pool")]
    InvalidReference { kind: PoolKind, id: Uuid },

    #[error("slide index {index} is out of range (playlist has {len} slides)")]
    SlideOutOfRange { index: usize, len: usize },

    /// A slide's image could not be resolved. Should never happen through the public API.
    #[error("slide {slide_id} has no resolvable image ({image_id})")]
    Integrity { slide_id: Uuid, image_id: Uuid },

    #[error("{kind} entry {id} is still bound to slide {slide_id}")]
    StillReferenced {
        kind: PoolKind,
        id: Uuid,
        slide_id: Uuid,
    },

    #[error("{kind} pool does not accept {payload} payloads")]
    PayloadKind {
        kind: PoolKind,
        payload: &'static str,
    },

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: PoolKind, id: Uuid },

    #[error("duplicate slide id {0}")]
    DuplicateSlideId(Uuid),

    #[error("invalid player setting: {0}")]
    InvalidSetting(String),
}

/// Failure to load a project artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Not syntactically valid JSON
    #[error("artifact is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// Valid JSON, wrong or missing version, or wrong shape
    #[error("artifact schema error: {0}")]
    Schema(String),

    #[error("artifact payload could not be decoded: {0}")]
    Codec(#[from] CodecError),

    #[error("artifact violates document integrity: {0}")]
    Document(#[from] DocumentError),
}

/// Per-file failure while preparing a folder import
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{name}: read {actual} bytes but file reported {declared}")]
    SizeMismatch {
        name: String,
        declared: u64,
        actual: u64,
    },

    #[error("{name}: unparseable MIME type {mime_type:?}")]
    InvalidMimeType { name: String, mime_type: String },
}
