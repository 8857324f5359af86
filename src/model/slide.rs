use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Where the caption box is drawn relative to the image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionPosition {
    #[default]
    Bottom,
    Right,
}

impl std::str::FromStr for CaptionPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bottom" => Ok(CaptionPosition::Bottom),
            "right" => Ok(CaptionPosition::Right),
            other => Err(format!("unknown caption position: {other}")),
        }
    }
}

/// Per-slide presentation settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideConfig {
    #[serde(default)]
    pub caption_position: CaptionPosition,
}

/// One playlist entry, binding pool entries by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSlide {
    pub id: Uuid,

    /// Always resolves to an entry of the image pool
    pub image_id: Uuid,

    /// `None` means unbound. Written as `""` in the artifact.
    #[serde(default, with = "optional_id")]
    pub audio_id: Option<Uuid>,

    #[serde(default, with = "optional_id")]
    pub text_id: Option<Uuid>,

    #[serde(default)]
    pub config: SlideConfig,
}

impl PlaylistSlide {
    /// New slide bound only to an image
    pub fn new(image_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_id,
            audio_id: None,
            text_id: None,
            config: SlideConfig::default(),
        }
    }

    pub fn with_audio(mut self, audio_id: Option<Uuid>) -> Self {
        self.audio_id = audio_id;
        self
    }

    pub fn with_text(mut self, text_id: Option<Uuid>) -> Self {
        self.text_id = text_id;
        self
    }
}

/// Unbound ids may arrive as `""`, `null` or be missing; all mean `None`
mod optional_id {
    use super::*;

    pub fn serialize<S: Serializer>(id: &Option<Uuid>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => id.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Uuid>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Uuid::parse_str(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
