//! Entry persistence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info};

use crate::entry::{Classification, Entry, EntryId, EntryPatch, EntrySource};
use crate::taxonomy::Secondary;
use crate::util::{local_date, stable_pair};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entry {0} not found")]
    NotFound(EntryId),
    #[error("entry {0} already exists")]
    Duplicate(EntryId),
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

pub trait EntryStore: Send {
    /// All entries, newest first.
    fn list(&self) -> Result<Vec<Entry>, StoreError>;
    fn get(&self, id: &EntryId) -> Result<Option<Entry>, StoreError>;
    fn insert(&mut self, entry: Entry) -> Result<(), StoreError>;
    /// Applies `patch` and returns the updated entry.
    fn update(&mut self, id: &EntryId, patch: EntryPatch) -> Result<Entry, StoreError>;
    /// Returns whether an entry was removed.
    fn delete(&mut self, id: &EntryId) -> Result<bool, StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Vec<Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }
}

impl EntryStore for MemoryStore {
    fn list(&self) -> Result<Vec<Entry>, StoreError> {
        Ok(self.entries.clone())
    }

    fn get(&self, id: &EntryId) -> Result<Option<Entry>, StoreError> {
        Ok(self.position(id).map(|index| self.entries[index].clone()))
    }

    fn insert(&mut self, entry: Entry) -> Result<(), StoreError> {
        if self.position(&entry.id).is_some() {
            return Err(StoreError::Duplicate(entry.id));
        }
        self.entries.insert(0, entry);
        Ok(())
    }

    fn update(&mut self, id: &EntryId, patch: EntryPatch) -> Result<Entry, StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let entry = &mut self.entries[index];
        entry.apply(patch);
        Ok(entry.clone())
    }

    fn delete(&mut self, id: &EntryId) -> Result<bool, StoreError> {
        Ok(match self.position(id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        })
    }
}

/// Entries kept in a single JSON file, rewritten after every mutation.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Loads `path`, or starts empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read entry store {}", path.display()))?;
            serde_json::from_str::<Vec<Entry>>(&raw)
                .with_context(|| format!("failed to parse entry store {}", path.display()))?
        } else {
            Vec::new()
        };

        info!(path = %path.display(), entries = entries.len(), "entry store opened");
        Ok(Self {
            path,
            inner: MemoryStore::with_entries(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy and adopts it only once the copy is on disk.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut MemoryStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut staged = self.inner.clone();
        let outcome = change(&mut staged)?;
        self.save(&staged)?;
        self.inner = staged;
        Ok(outcome)
    }

    fn save(&self, staged: &MemoryStore) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&staged.entries)
            .context("failed to serialize entries")?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)
            .with_context(|| format!("failed to write {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), entries = staged.len(), "entry store saved");
        Ok(())
    }
}

impl EntryStore for JsonStore {
    fn list(&self) -> Result<Vec<Entry>, StoreError> {
        self.inner.list()
    }

    fn get(&self, id: &EntryId) -> Result<Option<Entry>, StoreError> {
        self.inner.get(id)
    }

    fn insert(&mut self, entry: Entry) -> Result<(), StoreError> {
        self.commit(|staged| staged.insert(entry))
    }

    fn update(&mut self, id: &EntryId, patch: EntryPatch) -> Result<Entry, StoreError> {
        self.commit(|staged| staged.update(id, patch))
    }

    fn delete(&mut self, id: &EntryId) -> Result<bool, StoreError> {
        if self.inner.position(id).is_none() {
            return Ok(false);
        }
        self.commit(|staged| staged.delete(id))
    }
}

const SAMPLE_LOCATIONS: [&str; 12] = [
    "Berlin",
    "New York",
    "Los Angeles",
    "Montreal",
    "London",
    "Tokyo",
    "Paris",
    "Lisbon",
    "Mexico City",
    "Seoul",
    "Bali",
    "San Francisco",
];

/// Typical (valence, arousal) for each label, used to place sample entries.
fn typical_affect(emotion: Secondary) -> (f32, f32) {
    use Secondary::*;
    match emotion {
        Gratitude => (0.6, 0.1),
        Pride => (0.6, 0.4),
        Relief => (0.3, -0.3),
        Calm => (0.4, -0.6),
        Acceptance => (0.25, -0.2),
        Love => (0.7, 0.1),
        Safety => (0.45, -0.45),
        Admiration => (0.55, 0.25),
        Anxiety => (-0.6, 0.4),
        Insecurity => (-0.5, 0.2),
        Dread => (-0.65, 0.5),
        Panic => (-0.75, 0.85),
        Awe => (0.4, 0.4),
        Shock => (-0.1, 0.8),
        Confusion => (-0.2, 0.3),
        Wonder => (0.5, 0.55),
        Grief => (-0.8, -0.2),
        Loneliness => (-0.7, -0.4),
        Disappointment => (-0.5, -0.1),
        Guilt => (-0.5, 0.0),
        Shame => (-0.6, 0.1),
        Embarrassment => (-0.3, 0.2),
        Aversion => (-0.55, 0.25),
        Contempt => (-0.45, 0.15),
        Frustration => (-0.4, 0.6),
        Resentment => (-0.5, 0.4),
        Irritation => (-0.35, 0.45),
        Rage => (-0.7, 0.85),
        Hope => (0.5, 0.3),
        Curiosity => (0.2, 0.5),
        Determination => (0.2, 0.6),
        Nervousness => (-0.25, 0.5),
    }
}

/// `count` classified entries cycling through every label, one day apart ending today.
///
/// Placement jitter is derived from the entry id, so the same count yields the same atlas.
pub fn sample_entries(count: usize) -> Vec<Entry> {
    (0..count)
        .map(|index| {
            let emotion = Secondary::ALL[index % Secondary::ALL.len()];
            let id = EntryId::new(format!("sample_{index:04}"));
            let (base_valence, base_arousal) = typical_affect(emotion);
            let (jitter_x, jitter_y) = stable_pair(id.as_str());
            let classification = Classification::new(
                emotion,
                base_valence + jitter_x * 0.11,
                base_arousal + jitter_y * 0.11,
                0.62,
            );

            let mut entry = Entry::new(
                id,
                format!("{emotion} entry #{}", index + 1),
                local_date(index as i64),
            )
            .with_classification(classification);
            entry.body = "Sample journal text.".to_owned();
            entry.location = Some(SAMPLE_LOCATIONS[index % SAMPLE_LOCATIONS.len()].to_owned());
            if index % 7 == 0 {
                entry.source = EntrySource::Image;
                entry.image_url =
                    Some(format!("https://picsum.photos/seed/{}/1200/900", index + 1));
            }
            entry
        })
        .collect()
}

/// Fills an empty store with [`sample_entries`]. Returns how many were added.
pub fn seed_if_empty(store: &mut dyn EntryStore, count: usize) -> Result<usize, StoreError> {
    if count == 0 || !store.list()?.is_empty() {
        return Ok(0);
    }

    let samples = sample_entries(count);
    let added = samples.len();
    for entry in samples.into_iter().rev() {
        store.insert(entry)?;
    }
    info!(added, "seeded sample entries");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryState;

    fn entry(id: &str) -> Entry {
        Entry::new(EntryId::new(id), id, "2024-05-01")
    }

    #[test]
    fn memory_store_crud() {
        let mut store = MemoryStore::new();
        store.insert(entry("a")).expect("insert a");
        store.insert(entry("b")).expect("insert b");

        let ids = store.list().expect("list");
        assert_eq!(ids.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), ["b", "a"]);

        let updated = store
            .update(
                &EntryId::new("a"),
                EntryPatch::classified(
                    Some("Renamed".to_owned()),
                    Classification::new(Secondary::Relief, 0.3, -0.3, 0.8),
                ),
            )
            .expect("update");
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.emotion(), Some(Secondary::Relief));
        assert_eq!(store.get(&EntryId::new("a")).expect("get"), Some(updated));

        assert!(store.delete(&EntryId::new("a")).expect("delete"));
        assert!(!store.delete(&EntryId::new("a")).expect("delete again"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_store_rejects_duplicates_and_unknown_ids() {
        let mut store = MemoryStore::new();
        store.insert(entry("a")).expect("insert");
        assert!(matches!(store.insert(entry("a")), Err(StoreError::Duplicate(_))));
        assert!(matches!(
            store.update(&EntryId::new("zzz"), EntryPatch::default()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn json_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("entries.json");

        let mut store = JsonStore::open(&path).expect("open");
        assert!(store.list().expect("list").is_empty());
        store.insert(entry("a")).expect("insert");
        store
            .update(
                &EntryId::new("a"),
                EntryPatch::classified(None, Classification::new(Secondary::Awe, 0.4, 0.4, 0.9)),
            )
            .expect("update");
        store.insert(entry("b")).expect("insert");
        store.delete(&EntryId::new("b")).expect("delete");

        let reopened = JsonStore::open(&path).expect("reopen");
        let entries = reopened.list().expect("list");
        assert_eq!(entries.len(), 1);
        assert!(matches!(entries[0].state, EntryState::Classified(_)));
        assert_eq!(entries[0].emotion(), Some(Secondary::Awe));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn json_store_keeps_memory_and_disk_in_step_when_saving_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("entries.json");

        let mut store = JsonStore::open(&path).expect("open");
        store.insert(entry("a")).expect("insert");
        fs::create_dir(path.with_extension("json.tmp")).expect("block staging file");

        assert!(matches!(store.insert(entry("b")), Err(StoreError::Persistence(_))));
        assert!(store.get(&EntryId::new("b")).expect("get").is_none());

        let patch =
            EntryPatch::classified(None, Classification::new(Secondary::Awe, 0.4, 0.4, 0.9));
        assert!(store.update(&EntryId::new("a"), patch).is_err());
        assert_eq!(store.get(&EntryId::new("a")).expect("get"), Some(entry("a")));

        assert!(store.delete(&EntryId::new("a")).is_err());
        assert_eq!(store.list().expect("list").len(), 1);

        let on_disk = JsonStore::open(&path).expect("reopen");
        assert_eq!(on_disk.list().expect("list"), store.list().expect("list"));
    }

    #[test]
    fn json_store_reports_corrupt_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("entries.json");
        fs::write(&path, "{ not json").expect("write");

        let error = JsonStore::open(&path).expect_err("corrupt store");
        assert!(format!("{error:#}").contains("failed to parse entry store"));
    }

    #[test]
    fn samples_are_deterministic_and_classified() {
        let first = sample_entries(40);
        let second = sample_entries(40);
        assert_eq!(first.len(), 40);
        assert_eq!(
            first.iter().map(Entry::anchor).collect::<Vec<_>>(),
            second.iter().map(Entry::anchor).collect::<Vec<_>>()
        );
        assert!(first.iter().all(|entry| entry.classification().is_some()));
        assert_eq!(first[0].source, EntrySource::Image);
        assert_eq!(first[1].source, EntrySource::Text);
        assert!(first[0].created_at > first[1].created_at);
    }

    #[test]
    fn seeding_only_fills_empty_stores() {
        let mut store = MemoryStore::new();
        assert_eq!(seed_if_empty(&mut store, 5).expect("seed"), 5);
        let listed = store.list().expect("list");
        assert_eq!(listed[0].id.as_str(), "sample_0000");
        assert_eq!(seed_if_empty(&mut store, 5).expect("seed again"), 0);
        assert_eq!(store.len(), 5);
    }
}
