use super::PlaylistSlide;
use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered slides. Position is the display and navigation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Playlist {
    slides: Vec<PlaylistSlide>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slide bound only to `image_id`
    pub fn append_slide(&mut self, image_id: Uuid) -> &PlaylistSlide {
        self.slides.push(PlaylistSlide::new(image_id));
        &self.slides[self.slides.len() - 1]
    }

    /// Replace the slide at `index` wholesale, returning the previous one.
    /// Reference checks are the caller's job.
    pub(crate) fn edit(
        &mut self,
        index: usize,
        slide: PlaylistSlide,
    ) -> Result<PlaylistSlide, DocumentError> {
        let len = self.slides.len();
        let current = self
            .slides
            .get_mut(index)
            .ok_or(DocumentError::SlideOutOfRange { index, len })?;
        Ok(std::mem::replace(current, slide))
    }

    /// Move the slide at `old_index` to `new_index`, shifting the ones between by one
    pub fn reorder(&mut self, old_index: usize, new_index: usize) -> Result<(), DocumentError> {
        move_element(&mut self.slides, old_index, new_index)
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistSlide> {
        self.slides.get(index)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlaylistSlide> {
        self.slides.iter_mut()
    }

    pub(crate) fn clear(&mut self) {
        self.slides.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaylistSlide> {
        self.slides.iter()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Move one element of `items` from `old_index` to `new_index`.
///
/// Any array kept parallel to the playlist must be moved with this same
/// function so position `k` keeps describing the same item in both.
pub fn move_element<T>(
    items: &mut Vec<T>,
    old_index: usize,
    new_index: usize,
) -> Result<(), DocumentError> {
    let len = items.len();
    for index in [old_index, new_index] {
        if index >= len {
            return Err(DocumentError::SlideOutOfRange { index, len });
        }
    }
    if old_index != new_index {
        let item = items.remove(old_index);
        items.insert(new_index, item);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist_of(n: usize) -> Playlist {
        let mut playlist = Playlist::new();
        for _ in 0..n {
            playlist.append_slide(Uuid::new_v4());
        }
        playlist
    }

    fn ids(playlist: &Playlist) -> Vec<Uuid> {
        playlist.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_append_slide() {
        let mut playlist = Playlist::new();
        let image = Uuid::new_v4();
        let slide_id = playlist.append_slide(image).id;

        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.get(0).unwrap().id, slide_id);
        assert_eq!(playlist.get(0).unwrap().image_id, image);
    }

    #[test]
    fn test_reorder_forward() {
        let mut playlist = playlist_of(5);
        let before = ids(&playlist);

        playlist.reorder(1, 3).unwrap();

        let after = ids(&playlist);
        assert_eq!(after, vec![before[0], before[2], before[3], before[1], before[4]]);
    }

    #[test]
    fn test_reorder_backward() {
        let mut playlist = playlist_of(5);
        let before = ids(&playlist);

        playlist.reorder(4, 0).unwrap();

        let after = ids(&playlist);
        assert_eq!(after, vec![before[4], before[0], before[1], before[2], before[3]]);
    }

    #[test]
    fn test_reorder_preserves_ids() {
        let mut playlist = playlist_of(6);
        let mut before = ids(&playlist);

        playlist.reorder(0, 5).unwrap();
        playlist.reorder(2, 1).unwrap();

        let mut after = ids(&playlist);
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_reorder_out_of_range_is_rejected() {
        let mut playlist = playlist_of(2);
        let before = ids(&playlist);
        assert!(matches!(
            playlist.reorder(0, 2),
            Err(DocumentError::SlideOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(ids(&playlist), before);
    }

    #[test]
    fn test_edit_out_of_range() {
        let mut playlist = playlist_of(1);
        let slide = PlaylistSlide::new(Uuid::new_v4());
        assert!(playlist.edit(3, slide).is_err());
    }
}
