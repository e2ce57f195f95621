pub mod catalog;
pub mod domain;
pub mod ports;

pub use domain::{
    Bookmark, Chapter, ChapterAudio, ChapterDetail, ChapterSummary, EditionVerse, LastRead,
    Pagination, Reciter, RevelationPlace, Section, SectionVerses, Verse, VerseKey, VerseRange,
};
pub use ports::{ContentService, KeyValueStorage, PortError, PortResult, ProgressStore};
