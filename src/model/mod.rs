//! Project document model
//!
//! A [`Document`] owns three resource pools (image, audio, text) and an
//! ordered [`Playlist`] whose slides refer to pool entries by id. Pools are
//! append-mostly: unbinding a slide never deletes the entry it pointed at.

mod document;
mod playlist;
mod resource;
mod slide;

pub use document::{
    Document, ImportReport, PlayerSettings, ResolvedSlide, FORMAT_VERSION, MAX_TEXT_SPEED_MS,
};
pub use playlist::{move_element, Playlist};
pub use resource::{Pool, PoolKind, RawPayload, ResourceEntry, ResourcePool};
pub use slide::{CaptionPosition, PlaylistSlide, SlideConfig};
