use super::{
    CaptionPosition, Playlist, PlaylistSlide, PoolKind, RawPayload, ResourceEntry, ResourcePool,
    SlideConfig,
};
use crate::error::{DocumentError, MediaError};
use crate::media::{encode_batch, MediaFile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Artifact format version written on export
pub const FORMAT_VERSION: &str = "1.0.0";

/// Upper bound of the per-character caption delay, in milliseconds
pub const MAX_TEXT_SPEED_MS: u32 = 10_000;

/// Default playback settings for the packaged player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Delay between caption characters in milliseconds (0 = show at once)
    pub text_speed: u32,

    /// Audio volume, 0.0 to 1.0
    pub volume: f32,

    pub autoplay: bool,

    /// Advance to the next slide when the current one finishes
    pub autoplay_nextpage: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            text_speed: 100,
            volume: 1.0,
            autoplay: false,
            autoplay_nextpage: false,
        }
    }
}

impl PlayerSettings {
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.text_speed > MAX_TEXT_SPEED_MS {
            return Err(DocumentError::InvalidSetting(format!(
                "text_speed {} exceeds {} ms",
                self.text_speed, MAX_TEXT_SPEED_MS
            )));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(DocumentError::InvalidSetting(format!(
                "volume {} is outside 0.0..=1.0",
                self.volume
            )));
        }
        Ok(())
    }
}

/// Outcome of a folder import
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Ids of the new pool entries, in file order
    pub added: Vec<Uuid>,

    /// Files skipped because they could not be prepared
    pub failures: Vec<MediaError>,

    /// Slide bindings cleared because their entry disappeared
    pub cleared_bindings: usize,
}

/// A slide with its bound entries looked up
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSlide<'a> {
    pub slide: &'a PlaylistSlide,
    pub image: &'a ResourceEntry,
    pub audio: Option<&'a ResourceEntry>,
    pub text: Option<&'a ResourceEntry>,
    pub config: SlideConfig,
}

/// A complete project: metadata, resource pools and playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    version: String,
    package_name: String,
    description: String,
    #[serde(default)]
    player: PlayerSettings,
    #[serde(default)]
    src: ResourcePool,
    #[serde(default)]
    playlist: Playlist,
}

impl Document {
    /// Empty project with default player settings
    pub fn create(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            package_name: title.into(),
            description: description.into(),
            player: PlayerSettings::default(),
            src: ResourcePool::new(),
            playlist: Playlist::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn player(&self) -> &PlayerSettings {
        &self.player
    }

    pub fn src(&self) -> &ResourcePool {
        &self.src
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn set_package_name(&mut self, name: impl Into<String>) {
        self.package_name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_player(&mut self, player: PlayerSettings) -> Result<(), DocumentError> {
        player.validate()?;
        self.player = player;
        Ok(())
    }

    /// Replace the image pool and rebuild the playlist with one slide per image.
    ///
    /// All files are encoded before anything is mutated. Files that fail are
    /// skipped and reported.
    pub fn import_images(&mut self, files: &[MediaFile]) -> ImportReport {
        let batch = encode_batch(files);

        self.src.image.clear();
        self.playlist.clear();

        let mut added = Vec::with_capacity(batch.encoded.len());
        for media in batch.encoded {
            let id = self.src.image.push(media.name, media.data);
            self.playlist.append_slide(id);
            added.push(id);
        }

        log::info!(
            "Opened {} image(s), {} skipped; playlist rebuilt with {} slide(s)",
            added.len(),
            batch.failures.len(),
            self.playlist.len()
        );

        ImportReport {
            added,
            failures: batch.failures,
            cleared_bindings: 0,
        }
    }

    /// Replace the audio pool, clearing bindings to entries that no longer exist
    pub fn import_audio(&mut self, files: &[MediaFile]) -> ImportReport {
        let batch = encode_batch(files);

        self.src.audio.clear();
        let added: Vec<Uuid> = batch
            .encoded
            .into_iter()
            .map(|media| self.src.audio.push(media.name, media.data))
            .collect();

        let audio = &self.src.audio;
        let mut cleared_bindings = 0;
        for slide in self.playlist.iter_mut() {
            if slide.audio_id.is_some_and(|id| !audio.contains(&id)) {
                slide.audio_id = None;
                cleared_bindings += 1;
            }
        }
        if cleared_bindings > 0 {
            log::warn!("Cleared {} audio binding(s) after reopening audio", cleared_bindings);
        }

        log::info!(
            "Opened {} audio file(s), {} skipped",
            added.len(),
            batch.failures.len()
        );

        ImportReport {
            added,
            failures: batch.failures,
            cleared_bindings,
        }
    }

    /// Add a single resource without touching the playlist
    pub fn add_resource(
        &mut self,
        kind: PoolKind,
        name: impl Into<String>,
        payload: RawPayload<'_>,
    ) -> Result<Uuid, DocumentError> {
        self.src.add_entry(kind, name, payload)
    }

    /// Delete a pool entry. Entries still bound to a slide are refused.
    pub fn remove_resource(
        &mut self,
        kind: PoolKind,
        id: &Uuid,
    ) -> Result<Option<ResourceEntry>, DocumentError> {
        if let Some(slide) = self.playlist.iter().find(|s| slide_refers(s, kind, id)) {
            return Err(DocumentError::StillReferenced {
                kind,
                id: *id,
                slide_id: slide.id,
            });
        }
        Ok(self.src.pool_mut(kind).remove(id))
    }

    /// Replace the slide at `index`.
    ///
    /// Every bound id must exist in its pool, otherwise the document is left
    /// unchanged. The slide keeps its original id.
    pub fn edit(&mut self, index: usize, mut slide: PlaylistSlide) -> Result<(), DocumentError> {
        let current = self.slide(index)?;
        self.check_references(&slide)?;
        slide.id = current.id;
        self.playlist.edit(index, slide)?;
        Ok(())
    }

    /// Bind (or with `None`, unbind) an audio entry to a slide
    pub fn bind_audio(
        &mut self,
        index: usize,
        audio_id: Option<Uuid>,
    ) -> Result<(), DocumentError> {
        let slide = self.slide(index)?.clone().with_audio(audio_id);
        self.edit(index, slide)
    }

    /// Set the caption of a slide.
    ///
    /// Updates the bound text entry in place, or creates and binds one. An
    /// empty caption unbinds the slide's text but keeps the pool entry.
    pub fn set_caption(&mut self, index: usize, text: &str) -> Result<Option<Uuid>, DocumentError> {
        let slide = self.slide(index)?.clone();

        if text.is_empty() {
            self.edit(index, slide.with_text(None))?;
            return Ok(None);
        }

        if let Some(text_id) = slide.text_id {
            if self.src.text.update_entry(&text_id, text.to_string()) {
                return Ok(Some(text_id));
            }
        }

        let name = self
            .src
            .image
            .find_entry(&slide.image_id)
            .map(|image| caption_name(&image.name))
            .unwrap_or_else(|| format!("caption-{}", slide.id));
        let text_id = self.src.add_entry(PoolKind::Text, name, RawPayload::Text(text))?;
        self.edit(index, slide.with_text(Some(text_id)))?;
        Ok(Some(text_id))
    }

    pub fn set_caption_position(
        &mut self,
        index: usize,
        position: CaptionPosition,
    ) -> Result<(), DocumentError> {
        let mut slide = self.slide(index)?.clone();
        slide.config.caption_position = position;
        self.edit(index, slide)
    }

    pub fn reorder(&mut self, old_index: usize, new_index: usize) -> Result<(), DocumentError> {
        self.playlist.reorder(old_index, new_index)
    }

    /// Look up the entries bound to the slide at `index`
    pub fn resolve(&self, index: usize) -> Result<ResolvedSlide<'_>, DocumentError> {
        let slide = self.slide(index)?;
        let image = self
            .src
            .image
            .find_entry(&slide.image_id)
            .ok_or(DocumentError::Integrity {
                slide_id: slide.id,
                image_id: slide.image_id,
            })?;

        Ok(ResolvedSlide {
            slide,
            image,
            audio: slide.audio_id.and_then(|id| self.src.audio.find_entry(&id)),
            text: slide.text_id.and_then(|id| self.src.text.find_entry(&id)),
            config: slide.config,
        })
    }

    /// Wholesale substitution, used after a successful import
    pub fn replace(&mut self, other: Document) {
        *self = other;
    }

    /// Check id uniqueness and that every bound id resolves
    pub fn validate(&self) -> Result<(), DocumentError> {
        for kind in PoolKind::ALL {
            if let Some(&id) = self.src.pool(kind).duplicate_ids().first() {
                return Err(DocumentError::DuplicateId { kind, id });
            }
        }

        let mut slide_ids = HashSet::with_capacity(self.playlist.len());
        for slide in self.playlist.iter() {
            if !slide_ids.insert(slide.id) {
                return Err(DocumentError::DuplicateSlideId(slide.id));
            }
            self.check_references(slide)?;
        }

        self.player.validate()
    }

    /// Copy of the document without pool entries no slide refers to
    pub fn pruned(&self) -> Document {
        let mut pruned = self.clone();
        for kind in PoolKind::ALL {
            let referenced: HashSet<Uuid> = self
                .playlist
                .iter()
                .filter_map(|s| bound_id(s, kind))
                .collect();
            pruned
                .src
                .pool_mut(kind)
                .retain(|entry| referenced.contains(&entry.id));
        }
        pruned
    }

    fn slide(&self, index: usize) -> Result<&PlaylistSlide, DocumentError> {
        self.playlist.get(index).ok_or(DocumentError::SlideOutOfRange {
            index,
            len: self.playlist.len(),
        })
    }

    fn check_references(&self, slide: &PlaylistSlide) -> Result<(), DocumentError> {
        for kind in PoolKind::ALL {
            if let Some(id) = bound_id(slide, kind) {
                if !self.src.pool(kind).contains(&id) {
                    return Err(DocumentError::InvalidReference { kind, id });
                }
            }
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::create("", "")
    }
}

fn bound_id(slide: &PlaylistSlide, kind: PoolKind) -> Option<Uuid> {
    match kind {
        PoolKind::Image => Some(slide.image_id),
        PoolKind::Audio => slide.audio_id,
        PoolKind::Text => slide.text_id,
    }
}

fn slide_refers(slide: &PlaylistSlide, kind: PoolKind, id: &Uuid) -> bool {
    bound_id(slide, kind).as_ref() == Some(id)
}

/// "a.png" -> "a.txt"
fn caption_name(image_name: &str) -> String {
    let stem = image_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(image_name);
    format!("{stem}.txt")
}
