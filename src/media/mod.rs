//! Media files handed over by a folder selection
//!
//! Files are classified by MIME prefix (`image/*`, `audio/*`); anything else
//! is dropped. Scanning reads a directory from disk, batching encodes the
//! payloads ahead of any document mutation.

mod batch;
mod scanner;

pub use batch::{encode_batch, BatchOutcome, EncodedMedia};
pub use scanner::scan_folder;

/// One file from a folder selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// File name shown in the editor
    pub name: String,
    pub mime_type: String,
    /// Size reported by the file system
    pub byte_size: u64,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            byte_size: bytes.len() as u64,
            bytes,
        }
    }

    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_mime(&self.mime_type)
    }
}

/// Media categories a folder can contribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let top = mime_type.split('/').next()?.trim();
        if top.eq_ignore_ascii_case("image") {
            Some(MediaKind::Image)
        } else if top.eq_ignore_ascii_case("audio") {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }
}

/// Files split by category, in their original order
#[derive(Debug, Default)]
pub struct Partitioned {
    pub images: Vec<MediaFile>,
    pub audio: Vec<MediaFile>,
    /// Number of files that were neither image nor audio
    pub dropped: usize,
}

/// Split a folder selection into image-like and audio-like files
pub fn partition(files: Vec<MediaFile>) -> Partitioned {
    let mut out = Partitioned::default();
    for file in files {
        match file.kind() {
            Some(MediaKind::Image) => out.images.push(file),
            Some(MediaKind::Audio) => out.audio.push(file),
            None => {
                log::debug!("Dropping {} ({})", file.name, file.mime_type);
                out.dropped += 1;
            }
        }
    }
    out
}
