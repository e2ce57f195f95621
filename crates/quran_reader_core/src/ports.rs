//! crates/quran_reader_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the reader's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the remote content API and of the local storage mechanism.

use async_trait::async_trait;

use crate::domain::{
    Bookmark, Chapter, ChapterAudio, ChapterDetail, ChapterSummary, EditionVerse, LastRead,
    Reciter, Section, SectionVerses, VerseKey,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The network call failed, the remote answered with a non-success status,
    /// or its body did not have the expected shape.
    #[error("Remote content unavailable: {0}")]
    RemoteUnavailable(String),
    /// Persisted progress data could not be read back as the expected record.
    #[error("Stored data is corrupt: {0}")]
    StorageCorrupt(String),
    #[error("Invalid verse key: '{0}'")]
    InvalidVerseKey(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Read-only access to chapters, sections, verses and recitations.
///
/// Implementations never touch local progress state.
#[async_trait]
pub trait ContentService: Send + Sync {
    async fn list_chapters(&self) -> PortResult<Vec<Chapter>>;

    /// Lists all sections, keeping only the first record for each section number.
    async fn list_sections(&self) -> PortResult<Vec<Section>>;

    /// Best-effort: yields an empty list when the section is unknown or any
    /// remote call fails.
    async fn list_chapters_in_section(&self, juz_number: u32) -> Vec<ChapterSummary>;

    async fn get_section_verses(&self, juz_number: u32, page: u32) -> PortResult<SectionVerses>;

    /// Joins metadata, original text, translation and transliteration.
    /// Fails as a whole if any of them fails.
    async fn get_chapter_detail(&self, chapter_id: u32) -> PortResult<ChapterDetail>;

    async fn list_reciters(&self) -> PortResult<Vec<Reciter>>;

    async fn get_chapter_audio(&self, reciter_id: u32, chapter_id: u32)
        -> PortResult<ChapterAudio>;

    /// Translation of a single verse with all markup removed, if the source has one.
    async fn get_verse_translation(&self, verse_key: VerseKey) -> PortResult<Option<String>>;

    /// The whole text of an alternate translation edition, e.g. `en.asad`.
    async fn get_edition_translation(&self, edition: &str) -> PortResult<Vec<EditionVerse>>;
}

/// Bookmarks and the last-read pointer.
///
/// All operations are synchronous and never fail: unreadable storage yields
/// the empty value for the operation.
pub trait ProgressStore: Send + Sync {
    /// Bookmarks in insertion order.
    fn get_bookmarks(&self) -> Vec<Bookmark>;

    /// Appends a bookmark unless one with the same key exists, in which case
    /// nothing changes (the existing timestamp is kept).
    fn add_bookmark(&self, chapter_id: u32, verse_number: u32, chapter_name: &str)
        -> Vec<Bookmark>;

    /// Removes every bookmark with the given key. Always persists the result.
    fn remove_bookmark(&self, chapter_id: u32, verse_number: u32) -> Vec<Bookmark>;

    fn get_last_read(&self) -> Option<LastRead>;

    /// Overwrites the last-read pointer.
    fn set_last_read(&self, chapter_id: u32, verse_number: u32, chapter_name: &str) -> LastRead;

    fn is_bookmarked(&self, chapter_id: u32, verse_number: u32) -> bool {
        let key = VerseKey::new(chapter_id, verse_number);
        self.get_bookmarks().iter().any(|b| b.key() == key)
    }

    fn chapter_has_bookmark(&self, chapter_id: u32) -> bool {
        self.get_bookmarks()
            .iter()
            .any(|b| b.chapter_id == chapter_id)
    }

    fn is_last_read_chapter(&self, chapter_id: u32) -> bool {
        self.get_last_read()
            .is_some_and(|last| last.chapter_id == chapter_id)
    }
}

/// A synchronous string key-value store, in the manner of browser local storage.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> PortResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> PortResult<()>;
}
