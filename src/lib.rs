//! Sound Novel Studio - slideshow package authoring
//!
//! This library binds images, audio and caption text into an ordered
//! playlist and saves the whole project, media included, as a single JSON
//! artifact that loads back losslessly.

pub mod codec;
pub mod error;
pub mod export;
pub mod media;
pub mod model;
pub mod player;
pub mod store;
pub mod validation;

pub use error::{ArtifactError, CodecError, DocumentError, MediaError};
pub use export::{ExportConfig, Exporter};
pub use model::Document;
pub use store::ProjectStore;
