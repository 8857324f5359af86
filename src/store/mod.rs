//! Observable project root
//!
//! [`ProjectStore`] is the single owner of the open [`Document`]. Every
//! mutation goes through it, is applied atomically and is announced to
//! subscribers. It also keeps the editor's 1-based slide selection and the
//! display handles the rendering surface needs, one thumbnail per slide in
//! playlist order.

mod display;

pub use display::{DisplaySurface, Headless};

use crate::codec;
use crate::error::{ArtifactError, DocumentError};
use crate::export::artifact;
use crate::media::{partition, MediaFile};
use crate::model::{move_element, Document, ImportReport, Pool, ResolvedSlide};
use std::collections::HashMap;
use uuid::Uuid;

/// What changed in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A new or imported document replaced the previous one
    Replaced,
    ImagesOpened { slides: usize },
    AudioOpened { entries: usize },
    /// Generic update through [`ProjectStore::set`]
    Updated,
    Reordered { from: usize, to: usize },
    /// New 1-based selection
    Selected(Option<usize>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Change)>;

pub struct ProjectStore<S: DisplaySurface = Headless> {
    document: Document,
    surface: S,
    /// Parallel to the playlist: (image id, handle) per slide
    thumbnails: Vec<(Uuid, Option<S::Handle>)>,
    audio_handles: HashMap<Uuid, S::Handle>,
    selected: Option<usize>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl ProjectStore<Headless> {
    pub fn headless() -> Self {
        Self::new(Headless)
    }
}

impl<S: DisplaySurface> ProjectStore<S> {
    /// Store holding an empty untitled project
    pub fn new(surface: S) -> Self {
        Self {
            document: Document::default(),
            surface,
            thumbnails: Vec::new(),
            audio_handles: HashMap::new(),
            selected: None,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn get(&self) -> &Document {
        &self.document
    }

    /// Apply `updater` to a draft and commit it only if it succeeds
    pub fn set<T, E>(
        &mut self,
        updater: impl FnOnce(&mut Document) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut draft = self.document.clone();
        let value = updater(&mut draft)?;
        let previous = std::mem::replace(&mut self.document, draft);
        self.sync_thumbnails();
        if previous.src().audio != self.document.src().audio {
            self.sync_audio_handles(&previous.src().audio);
        }
        self.clamp_selection();
        self.notify(&Change::Updated);
        Ok(value)
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Change) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Start over with an empty project
    pub fn new_project(&mut self, title: &str, description: &str) {
        self.install(Document::create(title, description));
    }

    /// Load a document, replacing the open one.
    ///
    /// Every media payload is decoded before anything is replaced; a single
    /// undecodable entry aborts the load and leaves the store untouched.
    pub fn load(&mut self, document: Document) -> Result<(), ArtifactError> {
        document.validate()?;
        for entry in document.src().image.iter().chain(document.src().audio.iter()) {
            codec::decode(&entry.payload)?;
        }
        self.install(document);
        Ok(())
    }

    /// Parse an artifact and load it
    pub fn import(&mut self, artifact_text: &str) -> Result<(), ArtifactError> {
        let document = artifact::import(artifact_text)?;
        self.load(document)
    }

    pub fn export(&self) -> Result<String, serde_json::Error> {
        artifact::export(&self.document)
    }

    /// Replace the images with the image-like files of a folder selection
    pub fn open_image_folder(&mut self, files: Vec<MediaFile>) -> ImportReport {
        let parts = partition(files);
        if parts.dropped + parts.audio.len() > 0 {
            log::debug!(
                "Ignoring {} non-image file(s)",
                parts.dropped + parts.audio.len()
            );
        }

        let report = self.document.import_images(&parts.images);

        for (_, handle) in std::mem::take(&mut self.thumbnails) {
            if let Some(handle) = handle {
                self.surface.revoke(handle);
            }
        }
        self.sync_thumbnails();

        let slides = self.document.playlist().len();
        self.notify(&Change::ImagesOpened { slides });
        self.set_selected(if slides > 0 { Some(1) } else { None });
        report
    }

    /// Replace the audio pool with the audio-like files of a folder selection
    pub fn open_audio_folder(&mut self, files: Vec<MediaFile>) -> ImportReport {
        let parts = partition(files);
        let report = self.document.import_audio(&parts.audio);
        self.rebuild_audio_handles();
        self.notify(&Change::AudioOpened {
            entries: report.added.len(),
        });
        report
    }

    /// Move a slide (0-based) and its thumbnail together, selecting it afterwards
    pub fn reorder(&mut self, old_index: usize, new_index: usize) -> Result<(), DocumentError> {
        self.document.reorder(old_index, new_index)?;
        move_element(&mut self.thumbnails, old_index, new_index)?;
        self.notify(&Change::Reordered {
            from: old_index,
            to: new_index,
        });
        self.set_selected(Some(new_index + 1));
        Ok(())
    }

    /// Currently selected slide, 1-based
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Resolution of the selected slide. Valid until the next mutation.
    pub fn selected_slide(&self) -> Option<ResolvedSlide<'_>> {
        let index = self.selected?;
        self.document.resolve(index - 1).ok()
    }

    /// Select a slide by 1-based index. Out of range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < 1 || index > self.document.playlist().len() {
            return false;
        }
        self.set_selected(Some(index));
        true
    }

    pub fn first_slide(&mut self) -> bool {
        self.select(1)
    }

    pub fn last_slide(&mut self) -> bool {
        self.select(self.document.playlist().len())
    }

    pub fn next_slide(&mut self) -> bool {
        match self.selected {
            Some(i) => self.select(i + 1),
            None => false,
        }
    }

    pub fn previous_slide(&mut self) -> bool {
        match self.selected {
            Some(i) => self.select(i.saturating_sub(1)),
            None => false,
        }
    }

    /// Thumbnail for the slide at a 0-based index
    pub fn thumbnail(&self, index: usize) -> Option<&S::Handle> {
        self.thumbnails.get(index).and_then(|(_, h)| h.as_ref())
    }

    pub fn audio_handle(&self, id: &Uuid) -> Option<&S::Handle> {
        self.audio_handles.get(id)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn install(&mut self, document: Document) {
        self.document.replace(document);

        for (_, handle) in std::mem::take(&mut self.thumbnails) {
            if let Some(handle) = handle {
                self.surface.revoke(handle);
            }
        }
        self.sync_thumbnails();
        self.rebuild_audio_handles();

        self.notify(&Change::Replaced);
        let selected = if self.document.playlist().is_empty() {
            None
        } else {
            Some(1)
        };
        self.set_selected(selected);
    }

    /// Bring thumbnails in line with the playlist, reusing handles whose image is unchanged
    fn sync_thumbnails(&mut self) {
        let mut spare: HashMap<Uuid, Vec<Option<S::Handle>>> = HashMap::new();
        for (image_id, handle) in std::mem::take(&mut self.thumbnails) {
            spare.entry(image_id).or_default().push(handle);
        }

        let mut thumbnails = Vec::with_capacity(self.document.playlist().len());
        for slide in self.document.playlist().iter() {
            let reused = spare.get_mut(&slide.image_id).and_then(|v| v.pop());
            let handle = match reused {
                Some(handle) => handle,
                None => self
                    .document
                    .src()
                    .image
                    .find_entry(&slide.image_id)
                    .and_then(|entry| {
                        create_handle(&mut self.surface, &entry.name, &entry.payload)
                    }),
            };
            thumbnails.push((slide.image_id, handle));
        }

        for handle in spare.into_values().flatten().flatten() {
            self.surface.revoke(handle);
        }
        self.thumbnails = thumbnails;
    }

    /// Revoke handles of removed or rewritten audio entries and create the missing ones
    fn sync_audio_handles(&mut self, previous: &Pool) {
        let current = &self.document.src().audio;
        let stale: Vec<Uuid> = self
            .audio_handles
            .keys()
            .filter(|id| match (previous.find_entry(id), current.find_entry(id)) {
                (Some(old), Some(new)) => old.payload != new.payload,
                _ => true,
            })
            .copied()
            .collect();
        for id in stale {
            if let Some(handle) = self.audio_handles.remove(&id) {
                self.surface.revoke(handle);
            }
        }

        for entry in self.document.src().audio.iter() {
            if self.audio_handles.contains_key(&entry.id) {
                continue;
            }
            if let Some(handle) = create_handle(&mut self.surface, &entry.name, &entry.payload) {
                self.audio_handles.insert(entry.id, handle);
            }
        }
    }

    fn rebuild_audio_handles(&mut self) {
        for (_, handle) in self.audio_handles.drain() {
            self.surface.revoke(handle);
        }
        for entry in self.document.src().audio.iter() {
            if let Some(handle) = create_handle(&mut self.surface, &entry.name, &entry.payload) {
                self.audio_handles.insert(entry.id, handle);
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.document.playlist().len();
        let clamped = match self.selected {
            _ if len == 0 => None,
            Some(i) if i > len => Some(len),
            other => other,
        };
        if clamped != self.selected {
            self.set_selected(clamped);
        }
    }

    fn set_selected(&mut self, selected: Option<usize>) {
        self.selected = selected;
        self.notify(&Change::Selected(selected));
    }

    fn notify(&mut self, change: &Change) {
        for (_, observer) in self.observers.iter_mut() {
            observer(change);
        }
    }
}

fn create_handle<S: DisplaySurface>(
    surface: &mut S,
    name: &str,
    payload: &str,
) -> Option<S::Handle> {
    match codec::decode(payload) {
        Ok(decoded) => Some(surface.create(&decoded.bytes, &decoded.mime_type)),
        Err(e) => {
            log::warn!("Cannot display {}: {}", name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PoolKind, RawPayload};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Surface that tracks live handles by sequence number
    #[derive(Default)]
    struct CountingSurface {
        next: usize,
        live: Vec<usize>,
    }

    impl DisplaySurface for CountingSurface {
        type Handle = (usize, String);

        fn create(&mut self, bytes: &[u8], _mime_type: &str) -> (usize, String) {
            self.next += 1;
            self.live.push(self.next);
            (self.next, String::from_utf8_lossy(bytes).into_owned())
        }

        fn revoke(&mut self, handle: (usize, String)) {
            self.live.retain(|&h| h != handle.0);
        }
    }

    fn image(name: &str) -> MediaFile {
        MediaFile::new(name, "image/png", name.as_bytes().to_vec())
    }

    fn audio(name: &str) -> MediaFile {
        MediaFile::new(name, "audio/mpeg", name.as_bytes().to_vec())
    }

    fn thumbnail_names(store: &ProjectStore<CountingSurface>) -> Vec<String> {
        (0..store.get().playlist().len())
            .map(|i| store.thumbnail(i).unwrap().1.clone())
            .collect()
    }

    #[test]
    fn test_open_images_selects_first() {
        let mut store = ProjectStore::headless();
        store.open_image_folder(vec![image("a.png"), image("b.png"), audio("x.mp3")]);

        assert_eq!(store.get().playlist().len(), 2);
        assert_eq!(store.selected(), Some(1));
        assert_eq!(store.selected_slide().unwrap().image.name, "a.png");
    }

    #[test]
    fn test_navigation_bounds() {
        let mut store = ProjectStore::headless();
        store.open_image_folder(vec![image("a.png"), image("b.png"), image("c.png")]);

        assert!(!store.previous_slide());
        assert_eq!(store.selected(), Some(1));
        assert!(store.next_slide());
        assert!(store.last_slide());
        assert_eq!(store.selected(), Some(3));
        assert!(!store.next_slide());
        assert!(!store.select(0));
        assert!(!store.select(4));
        assert!(store.first_slide());
        assert_eq!(store.selected(), Some(1));
    }

    #[test]
    fn test_reorder_moves_thumbnails_with_slides() {
        let mut store = ProjectStore::new(CountingSurface::default());
        store.open_image_folder(vec![image("a"), image("b"), image("c"), image("d")]);

        store.reorder(0, 2).unwrap();

        assert_eq!(thumbnail_names(&store), vec!["b", "c", "a", "d"]);
        for i in 0..4 {
            let resolved = store.get().resolve(i).unwrap();
            assert_eq!(resolved.image.name, store.thumbnail(i).unwrap().1);
        }
        assert_eq!(store.selected(), Some(3));
        assert_eq!(store.surface().live.len(), 4);
    }

    #[test]
    fn test_reopen_revokes_old_handles() {
        let mut store = ProjectStore::new(CountingSurface::default());
        store.open_image_folder(vec![image("a"), image("b")]);
        store.open_image_folder(vec![image("c")]);

        assert_eq!(store.surface().live.len(), 1);
        assert_eq!(thumbnail_names(&store), vec!["c"]);
    }

    #[test]
    fn test_failed_set_leaves_state_and_skips_notify() {
        let mut store = ProjectStore::headless();
        store.open_image_folder(vec![image("a.png")]);
        let before = store.get().clone();

        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        store.subscribe(move |c| sink.borrow_mut().push(c.clone()));

        let result = store.set(|doc| doc.bind_audio(0, Some(Uuid::new_v4())));

        assert!(result.is_err());
        assert_eq!(store.get(), &before);
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let mut store = ProjectStore::headless();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        let id = store.subscribe(move |c| sink.borrow_mut().push(c.clone()));

        store.open_image_folder(vec![image("a.png")]);
        store
            .set(|doc| doc.set_caption(0, "Hi").map(|_| ()))
            .unwrap();

        assert_eq!(
            *changes.borrow(),
            vec![
                Change::ImagesOpened { slides: 1 },
                Change::Selected(Some(1)),
                Change::Updated
            ]
        );

        assert!(store.unsubscribe(id));
        store.first_slide();
        assert_eq!(changes.borrow().len(), 3);
    }

    #[test]
    fn test_import_rebuilds_handles() {
        let mut source = ProjectStore::headless();
        source.open_image_folder(vec![image("a.png"), image("b.png")]);
        source.open_audio_folder(vec![audio("x.mp3")]);
        let text = source.export().unwrap();

        let mut store = ProjectStore::new(CountingSurface::default());
        store.import(&text).unwrap();

        assert_eq!(store.get(), source.get());
        assert_eq!(thumbnail_names(&store), vec!["a.png", "b.png"]);
        let audio_id = store.get().src().audio.entries()[0].id;
        assert_eq!(store.audio_handle(&audio_id).unwrap().1, "x.mp3");
        assert_eq!(store.selected(), Some(1));
    }

    #[test]
    fn test_set_keeps_audio_handles_in_step_with_pool() {
        let mut store = ProjectStore::new(CountingSurface::default());
        store.open_image_folder(vec![image("a")]);
        store.open_audio_folder(vec![audio("theme")]);
        let theme = store.get().src().audio.entries()[0].id;
        let theme_handle = store.audio_handle(&theme).unwrap().0;

        let extra = store
            .set(|doc| {
                let id = doc.add_resource(
                    PoolKind::Audio,
                    "rain",
                    RawPayload::Binary {
                        bytes: b"rain",
                        mime_type: "audio/ogg",
                    },
                )?;
                doc.bind_audio(0, Some(id))?;
                Ok::<_, DocumentError>(id)
            })
            .unwrap();

        assert_eq!(store.selected_slide().unwrap().audio.unwrap().id, extra);
        assert_eq!(store.audio_handle(&extra).unwrap().1, "rain");
        assert_eq!(store.audio_handle(&theme).unwrap().0, theme_handle);
        assert_eq!(store.surface().live.len(), 3);

        store
            .set(|doc| {
                doc.bind_audio(0, None)?;
                doc.remove_resource(PoolKind::Audio, &extra)
            })
            .unwrap();

        assert!(store.get().src().audio.find_entry(&extra).is_none());
        assert!(store.audio_handle(&extra).is_none());
        assert_eq!(store.audio_handle(&theme).unwrap().0, theme_handle);
        assert_eq!(store.surface().live.len(), 2);
    }

    #[test]
    fn test_set_import_audio_replaces_handles() {
        let mut store = ProjectStore::new(CountingSurface::default());
        store.open_audio_folder(vec![audio("old")]);
        let old = store.get().src().audio.entries()[0].id;

        store
            .set(|doc| Ok::<_, DocumentError>(doc.import_audio(&[audio("new")])))
            .unwrap();

        let new = store.get().src().audio.entries()[0].id;
        assert!(store.audio_handle(&old).is_none());
        assert_eq!(store.audio_handle(&new).unwrap().1, "new");
        assert_eq!(store.surface().live.len(), 1);
    }

    #[test]
    fn test_load_with_corrupt_payload_keeps_previous() {
        let mut store = ProjectStore::headless();
        store.open_image_folder(vec![image("keep.png")]);
        let before = store.get().clone();

        let mut bad = ProjectStore::headless();
        bad.open_image_folder(vec![image("a.png")]);
        let text = bad
            .export()
            .unwrap()
            .replace("data:image/png;base64,", "data:image/png;base64,***");

        assert!(matches!(store.import(&text), Err(ArtifactError::Codec(_))));
        assert_eq!(store.get(), &before);
    }

    #[test]
    fn test_new_project_clears() {
        let mut store = ProjectStore::new(CountingSurface::default());
        store.open_image_folder(vec![image("a")]);
        store.new_project("Fresh", "start");

        assert_eq!(store.get().package_name(), "Fresh");
        assert!(store.get().playlist().is_empty());
        assert_eq!(store.selected(), None);
        assert!(store.surface().live.is_empty());
    }
}
