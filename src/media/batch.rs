//! Parallel payload encoding for folder imports

use super::MediaFile;
use crate::codec;
use crate::error::MediaError;
use rayon::prelude::*;

/// A file ready to be pooled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMedia {
    pub name: String,
    /// Data URL
    pub data: String,
}

/// Result of encoding a batch. `encoded` keeps the input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub encoded: Vec<EncodedMedia>,
    pub failures: Vec<MediaError>,
}

/// Encode every file independently.
///
/// A bad file is logged and reported; it never stops the rest of the batch.
pub fn encode_batch(files: &[MediaFile]) -> BatchOutcome {
    let results: Vec<Result<EncodedMedia, MediaError>> = files.par_iter().map(encode_one).collect();

    let mut outcome = BatchOutcome::default();
    for result in results {
        match result {
            Ok(media) => outcome.encoded.push(media),
            Err(e) => {
                log::warn!("Skipping file: {}", e);
                outcome.failures.push(e);
            }
        }
    }

    log::debug!(
        "Encoded {}/{} file(s)",
        outcome.encoded.len(),
        files.len()
    );
    outcome
}

fn encode_one(file: &MediaFile) -> Result<EncodedMedia, MediaError> {
    let actual = file.bytes.len() as u64;
    if actual != file.byte_size {
        return Err(MediaError::SizeMismatch {
            name: file.name.clone(),
            declared: file.byte_size,
            actual,
        });
    }

    let valid_mime = file
        .mime_type
        .split_once('/')
        .is_some_and(|(top, sub)| !top.trim().is_empty() && !sub.trim().is_empty());
    if !valid_mime {
        return Err(MediaError::InvalidMimeType {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
        });
    }

    Ok(EncodedMedia {
        name: file.name.clone(),
        data: codec::encode(&file.bytes, &file.mime_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_preserves_order() {
        let files: Vec<MediaFile> = (0..64)
            .map(|i| MediaFile::new(format!("{i:02}.png"), "image/png", vec![i as u8; i]))
            .collect();

        let outcome = encode_batch(&files);

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.encoded.len(), 64);
        for (i, media) in outcome.encoded.iter().enumerate() {
            assert_eq!(media.name, format!("{i:02}.png"));
            let decoded = codec::decode(&media.data).unwrap();
            assert_eq!(decoded.byte_length, i);
        }
    }

    #[test]
    fn test_truncated_file_is_reported() {
        let mut truncated = MediaFile::new("cut.png", "image/png", vec![1, 2, 3]);
        truncated.byte_size = 100;
        let files = vec![MediaFile::new("ok.png", "image/png", vec![9]), truncated];

        let outcome = encode_batch(&files);

        assert_eq!(outcome.encoded.len(), 1);
        assert_eq!(outcome.encoded[0].name, "ok.png");
        assert!(matches!(
            outcome.failures[0],
            MediaError::SizeMismatch { declared: 100, actual: 3, .. }
        ));
    }

    #[test]
    fn test_invalid_mime_is_reported() {
        let files = vec![MediaFile::new("odd", "image/", vec![1])];
        let outcome = encode_batch(&files);
        assert!(outcome.encoded.is_empty());
        assert!(matches!(outcome.failures[0], MediaError::InvalidMimeType { .. }));
    }
}
