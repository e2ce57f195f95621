//! services/reader/src/adapters/progress.rs
//!
//! This module contains the local progress adapter, which is the concrete
//! implementation of the `ProgressStore` port. Bookmarks and the last-read
//! pointer are kept as two JSON values in a `KeyValueStorage`.

use chrono::{DateTime, Utc};
use quran_reader_core::domain::{Bookmark, LastRead, VerseKey};
use quran_reader_core::ports::{KeyValueStorage, PortError, PortResult, ProgressStore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::{error, warn};

/// Storage key holding the JSON array of bookmarks.
pub const BOOKMARKS_KEY: &str = "quran_bookmarks";
/// Storage key holding the JSON last-read record.
pub const LAST_READ_KEY: &str = "quran_last_read";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A `ProgressStore` over any synchronous key-value storage.
pub struct LocalProgressStore<S> {
    storage: S,
    // Serializes read-modify-write cycles across threads.
    write_lock: Mutex<()>,
}

impl<S: KeyValueStorage> LocalProgressStore<S> {
    /// Creates a new `LocalProgressStore`.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    fn storage(&self) -> &S {
        &self.storage
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reads and decodes `key`. Absent keys are `Ok(None)`.
    fn read<T: DeserializeOwned>(&self, key: &str) -> PortResult<Option<T>> {
        let Some(raw) = self.storage.get_item(key)? else {
            return Ok(None);
        };
        serde_json::from_str::<Option<T>>(&raw)
            .map_err(|e| PortError::StorageCorrupt(format!("{}: {}", key, e)))
    }

    /// Like `read`, but a corrupt value is logged and treated as absent.
    fn read_or_absent<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable stored value");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(|e| PortError::Unexpected(e.to_string()))
            .and_then(|json| self.storage.set_item(key, &json));
        if let Err(e) = result {
            error!(key, error = %e, "failed to persist reading progress");
        }
    }

    fn load_bookmarks(&self) -> Vec<BookmarkRecord> {
        self.read_or_absent(BOOKMARKS_KEY).unwrap_or_default()
    }
}

//=========================================================================================
// Persisted Record Structs
//=========================================================================================

// The aliases accept records written by the earlier web client.

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookmarkRecord {
    #[serde(alias = "surahNumber")]
    chapter_id: u32,
    #[serde(alias = "verseNumber")]
    verse_number: u32,
    #[serde(alias = "surahName")]
    chapter_name: String,
    #[serde(alias = "timestamp")]
    created_at: DateTime<Utc>,
}

impl BookmarkRecord {
    fn key(&self) -> VerseKey {
        VerseKey::new(self.chapter_id, self.verse_number)
    }

    fn to_domain(&self) -> Bookmark {
        Bookmark {
            chapter_id: self.chapter_id,
            verse_number: self.verse_number,
            chapter_name: self.chapter_name.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LastReadRecord {
    #[serde(alias = "surahNumber")]
    chapter_id: u32,
    #[serde(alias = "verseNumber")]
    verse_number: u32,
    #[serde(alias = "surahName")]
    chapter_name: String,
    #[serde(alias = "timestamp")]
    updated_at: DateTime<Utc>,
}

impl LastReadRecord {
    fn to_domain(self) -> LastRead {
        LastRead {
            chapter_id: self.chapter_id,
            verse_number: self.verse_number,
            chapter_name: self.chapter_name,
            updated_at: self.updated_at,
        }
    }
}

fn to_domain_list(records: &[BookmarkRecord]) -> Vec<Bookmark> {
    records.iter().map(BookmarkRecord::to_domain).collect()
}

//=========================================================================================
// `ProgressStore` Trait Implementation
//=========================================================================================

impl<S: KeyValueStorage> ProgressStore for LocalProgressStore<S> {
    fn get_bookmarks(&self) -> Vec<Bookmark> {
        to_domain_list(&self.load_bookmarks())
    }

    fn add_bookmark(
        &self,
        chapter_id: u32,
        verse_number: u32,
        chapter_name: &str,
    ) -> Vec<Bookmark> {
        let _guard = self.lock();
        let mut records = self.load_bookmarks();
        let key = VerseKey::new(chapter_id, verse_number);

        if !records.iter().any(|r| r.key() == key) {
            records.push(BookmarkRecord {
                chapter_id,
                verse_number,
                chapter_name: chapter_name.to_string(),
                created_at: Utc::now(),
            });
            self.write(BOOKMARKS_KEY, &records);
        }
        to_domain_list(&records)
    }

    fn remove_bookmark(&self, chapter_id: u32, verse_number: u32) -> Vec<Bookmark> {
        let _guard = self.lock();
        let key = VerseKey::new(chapter_id, verse_number);
        let mut records = self.load_bookmarks();
        records.retain(|r| r.key() != key);
        self.write(BOOKMARKS_KEY, &records);
        to_domain_list(&records)
    }

    fn get_last_read(&self) -> Option<LastRead> {
        self.read_or_absent::<LastReadRecord>(LAST_READ_KEY)
            .map(LastReadRecord::to_domain)
    }

    fn set_last_read(&self, chapter_id: u32, verse_number: u32, chapter_name: &str) -> LastRead {
        let _guard = self.lock();
        let record = LastReadRecord {
            chapter_id,
            verse_number,
            chapter_name: chapter_name.to_string(),
            updated_at: Utc::now(),
        };
        self.write(LAST_READ_KEY, &record);
        record.to_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{FileStorage, MemoryStorage};
    use std::sync::Arc;

    fn store() -> LocalProgressStore<MemoryStorage> {
        LocalProgressStore::new(MemoryStorage::new())
    }

    /// Storage whose reads and/or writes always fail.
    #[derive(Default)]
    struct FailingStorage {
        reads_ok: bool,
        inner: MemoryStorage,
    }

    impl KeyValueStorage for FailingStorage {
        fn get_item(&self, key: &str) -> PortResult<Option<String>> {
            if self.reads_ok {
                return self.inner.get_item(key);
            }
            Err(PortError::StorageCorrupt(format!("{} is unreadable", key)))
        }

        fn set_item(&self, key: &str, _value: &str) -> PortResult<()> {
            Err(PortError::Unexpected(format!("{} is read-only", key)))
        }
    }

    fn keys(bookmarks: &[Bookmark]) -> Vec<(u32, u32)> {
        bookmarks
            .iter()
            .map(|b| (b.chapter_id, b.verse_number))
            .collect()
    }

    #[test]
    fn empty_store_has_no_progress() {
        let store = store();
        assert!(store.get_bookmarks().is_empty());
        assert_eq!(store.get_last_read(), None);
    }

    #[test]
    fn bookmarks_are_appended_in_insertion_order() {
        let store = store();
        store.add_bookmark(2, 255, "Al-Baqarah");
        store.add_bookmark(1, 1, "Al-Fatihah");
        let listed = store.add_bookmark(36, 1, "Ya-Sin");

        assert_eq!(keys(&listed), vec![(2, 255), (1, 1), (36, 1)]);
        assert_eq!(keys(&store.get_bookmarks()), keys(&listed));
        assert_eq!(listed[0].chapter_name, "Al-Baqarah");
    }

    #[test]
    fn adding_the_same_verse_twice_keeps_one_record_and_its_timestamp() {
        let store = store();
        let first = store.add_bookmark(18, 10, "Al-Kahf");
        let second = store.add_bookmark(18, 10, "Renamed");

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].created_at, first[0].created_at);
        assert_eq!(second[0].chapter_name, "Al-Kahf");
        assert_eq!(store.get_bookmarks(), first);
    }

    #[test]
    fn removing_a_bookmark_drops_only_that_key() {
        let store = store();
        store.add_bookmark(1, 1, "Al-Fatihah");
        store.add_bookmark(1, 2, "Al-Fatihah");

        let remaining = store.remove_bookmark(1, 1);
        assert_eq!(keys(&remaining), vec![(1, 2)]);
        assert!(!store.is_bookmarked(1, 1));
        assert!(store.is_bookmarked(1, 2));
    }

    #[test]
    fn removing_an_unknown_key_leaves_the_list_unchanged() {
        let store = store();
        store.add_bookmark(3, 7, "Ali 'Imran");
        store.add_bookmark(4, 1, "An-Nisa");
        let before = store.get_bookmarks();

        let after = store.remove_bookmark(99, 99);
        assert_eq!(after, before);
        assert_eq!(store.get_bookmarks(), before);
    }

    #[test]
    fn removing_from_an_empty_store_persists_an_empty_list() {
        let store = store();
        assert!(store.remove_bookmark(1, 1).is_empty());
        assert_eq!(
            store.storage().get_item(BOOKMARKS_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn bookmark_keys_stay_unique_under_any_call_sequence() {
        let store = store();
        for round in 0..3 {
            for verse in [1, 2, 1, 3, 2] {
                store.add_bookmark(7, verse, "Al-A'raf");
            }
            if round == 1 {
                store.remove_bookmark(7, 2);
            }
        }
        let mut listed = keys(&store.get_bookmarks());
        let total = listed.len();
        listed.sort();
        listed.dedup();
        assert_eq!(listed.len(), total);
        assert_eq!(listed, vec![(7, 1), (7, 2), (7, 3)]);
    }

    #[test]
    fn last_read_is_last_write_wins() {
        let store = store();
        store.set_last_read(1, 3, "Al-Fatihah");
        store.set_last_read(2, 40, "Al-Baqarah");
        let third = store.set_last_read(67, 5, "Al-Mulk");

        let stored = store.get_last_read().unwrap();
        assert_eq!(stored, third);
        assert_eq!(stored.key(), VerseKey::new(67, 5));
        assert_eq!(stored.chapter_name, "Al-Mulk");
        assert!(store.is_last_read_chapter(67));
        assert!(!store.is_last_read_chapter(2));
    }

    #[test]
    fn chapter_bookmark_lookup() {
        let store = store();
        store.add_bookmark(112, 1, "Al-Ikhlas");
        assert!(store.chapter_has_bookmark(112));
        assert!(!store.chapter_has_bookmark(113));
    }

    #[test]
    fn corrupt_or_mismatched_values_read_as_empty() {
        let store = store();
        for raw in ["not json", "{\"chapter_id\":1}", "[{\"x\":1}]", "42"] {
            store.storage().set_item(BOOKMARKS_KEY, raw).unwrap();
            store.storage().set_item(LAST_READ_KEY, raw).unwrap();
            assert!(store.get_bookmarks().is_empty(), "bookmarks from {:?}", raw);
            assert_eq!(store.get_last_read(), None, "last read from {:?}", raw);
        }
        store.storage().set_item(LAST_READ_KEY, "null").unwrap();
        assert_eq!(store.get_last_read(), None);
    }

    #[test]
    fn corrupt_bookmarks_are_replaced_on_next_add() {
        let store = store();
        store.storage().set_item(BOOKMARKS_KEY, "{{{").unwrap();
        let listed = store.add_bookmark(5, 3, "Al-Ma'idah");
        assert_eq!(keys(&listed), vec![(5, 3)]);
        assert_eq!(keys(&store.get_bookmarks()), vec![(5, 3)]);
    }

    #[test]
    fn failing_storage_never_fails_the_store() {
        let store = LocalProgressStore::new(FailingStorage::default());

        assert!(store.get_bookmarks().is_empty());
        assert_eq!(store.get_last_read(), None);
        assert!(!store.is_bookmarked(1, 1));

        let added = store.add_bookmark(2, 255, "Al-Baqarah");
        assert_eq!(keys(&added), vec![(2, 255)]);
        assert_eq!(added[0].chapter_name, "Al-Baqarah");
        assert!(store.remove_bookmark(2, 255).is_empty());

        let last = store.set_last_read(18, 10, "Al-Kahf");
        assert_eq!(last.key(), VerseKey::new(18, 10));
        assert_eq!(last.chapter_name, "Al-Kahf");
        assert_eq!(store.get_last_read(), None);
    }

    #[test]
    fn failed_writes_leave_stored_progress_untouched() {
        let storage = FailingStorage {
            reads_ok: true,
            ..Default::default()
        };
        storage
            .inner
            .set_item(
                BOOKMARKS_KEY,
                r#"[{"chapter_id":1,"verse_number":1,"chapter_name":"Al-Fatihah","created_at":"2024-01-01T00:00:00Z"}]"#,
            )
            .unwrap();
        let store = LocalProgressStore::new(storage);

        let added = store.add_bookmark(1, 2, "Al-Fatihah");
        assert_eq!(keys(&added), vec![(1, 1), (1, 2)]);
        assert_eq!(keys(&store.get_bookmarks()), vec![(1, 1)]);

        assert!(store.remove_bookmark(1, 1).is_empty());
        assert_eq!(keys(&store.get_bookmarks()), vec![(1, 1)]);
    }

    #[test]
    fn legacy_records_are_read() {
        let store = store();
        store
            .storage()
            .set_item(
                BOOKMARKS_KEY,
                r#"[{"surahNumber":2,"verseNumber":255,"surahName":"Al-Baqarah","timestamp":"2024-03-01T10:00:00.000Z"}]"#,
            )
            .unwrap();
        store
            .storage()
            .set_item(
                LAST_READ_KEY,
                r#"{"surahNumber":18,"verseNumber":1,"surahName":"Al-Kahf","timestamp":"2024-03-02T08:30:00.000Z"}"#,
            )
            .unwrap();

        let bookmarks = store.get_bookmarks();
        assert_eq!(keys(&bookmarks), vec![(2, 255)]);
        assert_eq!(bookmarks[0].created_at.to_rfc3339(), "2024-03-01T10:00:00+00:00");

        // A legacy record still counts for idempotence.
        assert_eq!(store.add_bookmark(2, 255, "Al-Baqarah").len(), 1);

        let last = store.get_last_read().unwrap();
        assert_eq!(last.key(), VerseKey::new(18, 1));
        assert_eq!(last.chapter_name, "Al-Kahf");
    }

    #[test]
    fn progress_survives_a_new_store_over_the_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = LocalProgressStore::new(FileStorage::open(dir.path()).unwrap());
            store.add_bookmark(36, 12, "Ya-Sin");
            store.set_last_read(36, 12, "Ya-Sin");
        }
        let reopened = LocalProgressStore::new(FileStorage::open(dir.path()).unwrap());
        assert_eq!(keys(&reopened.get_bookmarks()), vec![(36, 12)]);
        assert_eq!(
            reopened.get_last_read().map(|l| l.key()),
            Some(VerseKey::new(36, 12))
        );
    }

    #[test]
    fn concurrent_adds_do_not_duplicate_keys() {
        let store = Arc::new(store());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for verse in 1..=20 {
                        store.add_bookmark(2, verse, "Al-Baqarah");
                        if i % 2 == 0 {
                            store.add_bookmark(3, verse, "Ali 'Imran");
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get_bookmarks().len(), 40);
    }
}
