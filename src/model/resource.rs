use crate::codec;
use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// The three resource categories a slide can bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolKind {
    Image,
    Audio,
    Text,
}

impl PoolKind {
    pub const ALL: [PoolKind; 3] = [PoolKind::Image, PoolKind::Audio, PoolKind::Text];

    pub fn name(&self) -> &'static str {
        match self {
            PoolKind::Image => "image",
            PoolKind::Audio => "audio",
            PoolKind::Text => "text",
        }
    }

    /// Image and audio payloads are stored as data URLs
    pub fn is_binary(&self) -> bool {
        !matches!(self, PoolKind::Text)
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One pooled resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Generated once on creation, never reassigned
    pub id: Uuid,

    /// Display name (file name for media, label for captions)
    pub name: String,

    /// Data URL for image/audio, verbatim text for captions
    #[serde(rename = "data")]
    pub payload: String,
}

/// Payload handed to [`ResourcePool::add_entry`] before encoding
#[derive(Debug, Clone, Copy)]
pub enum RawPayload<'a> {
    Binary { bytes: &'a [u8], mime_type: &'a str },
    Text(&'a str),
}

impl RawPayload<'_> {
    fn label(&self) -> &'static str {
        match self {
            RawPayload::Binary { .. } => "binary",
            RawPayload::Text(_) => "text",
        }
    }
}

/// Insertion-ordered collection of entries addressed by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ResourceEntry>", into = "Vec<ResourceEntry>")]
pub struct Pool {
    entries: Vec<ResourceEntry>,
    index: HashMap<Uuid, usize>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already-formed payload under a fresh id
    pub(crate) fn push(&mut self, name: String, payload: String) -> Uuid {
        let mut id = Uuid::new_v4();
        while self.index.contains_key(&id) {
            id = Uuid::new_v4();
        }
        self.index.insert(id, self.entries.len());
        self.entries.push(ResourceEntry { id, name, payload });
        id
    }

    pub fn find_entry(&self, id: &Uuid) -> Option<&ResourceEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.index.contains_key(id)
    }

    /// Replace the payload of an existing entry.
    ///
    /// Returns `false` and leaves the pool untouched when `id` is unknown.
    pub fn update_entry(&mut self, id: &Uuid, payload: String) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.entries[i].payload = payload;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &Uuid) -> Option<ResourceEntry> {
        let position = self.index.remove(id)?;
        let entry = self.entries.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(entry)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Keep only the entries matching `keep`, preserving order
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&ResourceEntry) -> bool) {
        self.entries.retain(|e| keep(e));
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();
    }

    /// Ids that occur more than once (only possible after deserializing)
    pub fn duplicate_ids(&self) -> Vec<Uuid> {
        if self.index.len() == self.entries.len() {
            return Vec::new();
        }
        let mut seen = HashMap::new();
        let mut dups = Vec::new();
        for entry in &self.entries {
            let count = seen.entry(entry.id).or_insert(0u32);
            *count += 1;
            if *count == 2 {
                dups.push(entry.id);
            }
        }
        dups
    }

    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for Pool {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Pool {}

impl From<Vec<ResourceEntry>> for Pool {
    fn from(entries: Vec<ResourceEntry>) -> Self {
        let mut pool = Self {
            entries,
            index: HashMap::new(),
        };
        pool.rebuild_index();
        pool
    }
}

impl From<Pool> for Vec<ResourceEntry> {
    fn from(pool: Pool) -> Self {
        pool.entries
    }
}

/// The `src` section of a document: one pool per resource kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    #[serde(default)]
    pub image: Pool,
    #[serde(default)]
    pub audio: Pool,
    #[serde(default)]
    pub text: Pool,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(&self, kind: PoolKind) -> &Pool {
        match kind {
            PoolKind::Image => &self.image,
            PoolKind::Audio => &self.audio,
            PoolKind::Text => &self.text,
        }
    }

    pub fn pool_mut(&mut self, kind: PoolKind) -> &mut Pool {
        match kind {
            PoolKind::Image => &mut self.image,
            PoolKind::Audio => &mut self.audio,
            PoolKind::Text => &mut self.text,
        }
    }

    /// Add a new entry to one pool, encoding binary payloads as data URLs
    pub fn add_entry(
        &mut self,
        kind: PoolKind,
        name: impl Into<String>,
        payload: RawPayload<'_>,
    ) -> Result<Uuid, DocumentError> {
        let stored = match (kind.is_binary(), payload) {
            (true, RawPayload::Binary { bytes, mime_type }) => codec::encode(bytes, mime_type),
            (false, RawPayload::Text(text)) => text.to_string(),
            (_, other) => {
                return Err(DocumentError::PayloadKind {
                    kind,
                    payload: other.label(),
                })
            }
        };
        Ok(self.pool_mut(kind).push(name.into(), stored))
    }

    pub fn find_entry(&self, kind: PoolKind, id: &Uuid) -> Option<&ResourceEntry> {
        self.pool(kind).find_entry(id)
    }

    pub fn update_entry(&mut self, kind: PoolKind, id: &Uuid, payload: String) -> bool {
        self.pool_mut(kind).update_entry(id, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_binary_entry_is_encoded() {
        let mut src = ResourcePool::new();
        let id = src
            .add_entry(
                PoolKind::Image,
                "a.png",
                RawPayload::Binary {
                    bytes: b"png",
                    mime_type: "image/png",
                },
            )
            .unwrap();

        let entry = src.find_entry(PoolKind::Image, &id).unwrap();
        assert_eq!(entry.name, "a.png");
        assert_eq!(entry.payload, codec::encode(b"png", "image/png"));
    }

    #[test]
    fn test_text_entry_is_verbatim() {
        let mut src = ResourcePool::new();
        let id = src
            .add_entry(PoolKind::Text, "caption", RawPayload::Text("Hello,\nworld"))
            .unwrap();
        assert_eq!(src.text.find_entry(&id).unwrap().payload, "Hello,\nworld");
    }

    #[test]
    fn test_payload_kind_mismatch() {
        let mut src = ResourcePool::new();
        let err = src
            .add_entry(PoolKind::Audio, "x", RawPayload::Text("nope"))
            .unwrap_err();
        assert!(matches!(err, DocumentError::PayloadKind { kind: PoolKind::Audio, .. }));
        assert!(src.audio.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut pool = Pool::new();
        let a = pool.push("a".into(), String::new());
        let b = pool.push("b".into(), String::new());
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.entries()[0].name, "a");
    }

    #[test]
    fn test_update_missing_entry_is_noop() {
        let mut pool = Pool::new();
        let id = pool.push("a".into(), "old".into());
        assert!(!pool.update_entry(&Uuid::new_v4(), "new".into()));
        assert_eq!(pool.find_entry(&id).unwrap().payload, "old");
        assert!(pool.update_entry(&id, "new".into()));
        assert_eq!(pool.find_entry(&id).unwrap().payload, "new");
    }

    #[test]
    fn test_update_entry_through_pool_set() {
        let mut src = ResourcePool::new();
        let id = src
            .add_entry(PoolKind::Text, "c", RawPayload::Text("one"))
            .unwrap();
        assert!(src.update_entry(PoolKind::Text, &id, "two".into()));
        assert!(!src.update_entry(PoolKind::Audio, &id, "three".into()));
        assert_eq!(src.find_entry(PoolKind::Text, &id).unwrap().payload, "two");
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut pool = Pool::new();
        let a = pool.push("a".into(), String::new());
        let b = pool.push("b".into(), String::new());
        let c = pool.push("c".into(), String::new());

        assert_eq!(pool.remove(&a).unwrap().name, "a");
        assert!(pool.find_entry(&a).is_none());
        assert_eq!(pool.find_entry(&b).unwrap().name, "b");
        assert_eq!(pool.find_entry(&c).unwrap().name, "c");
    }

    #[test]
    fn test_duplicate_ids_detected_after_deserialize() {
        let id = Uuid::new_v4();
        let entry = ResourceEntry {
            id,
            name: "x".into(),
            payload: String::new(),
        };
        let pool = Pool::from(vec![entry.clone(), entry]);
        assert_eq!(pool.duplicate_ids(), vec![id]);
    }
}
