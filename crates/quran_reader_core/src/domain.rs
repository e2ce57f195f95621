//! crates/quran_reader_core/src/domain.rs
//!
//! Defines the pure, core data structures for the reader.
//! These structs are independent of the remote API's JSON shapes and of the
//! format used to persist reading progress.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::ports::PortError;

//=========================================================================================
// Verse Identity
//=========================================================================================

/// The `chapter:verse` address of a single verse.
///
/// This is the only place the compound textual form is parsed or produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseKey {
    pub chapter_id: u32,
    pub verse_number: u32,
}

impl VerseKey {
    pub fn new(chapter_id: u32, verse_number: u32) -> Self {
        Self {
            chapter_id,
            verse_number,
        }
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter_id, self.verse_number)
    }
}

impl FromStr for VerseKey {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PortError::InvalidVerseKey(s.to_string());
        let (chapter, verse) = s.trim().split_once(':').ok_or_else(invalid)?;
        let chapter_id = chapter.parse::<u32>().map_err(|_| invalid())?;
        let verse_number = verse.parse::<u32>().map_err(|_| invalid())?;
        if chapter_id == 0 || verse_number == 0 {
            return Err(invalid());
        }
        Ok(Self::new(chapter_id, verse_number))
    }
}

/// An inclusive range of verse numbers within one chapter, e.g. `1-141`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseRange {
    pub first: u32,
    pub last: u32,
}

impl FromStr for VerseRange {
    type Err = PortError;

    /// Accepts `first-last` or a single verse number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PortError::Unexpected(format!("Invalid verse range '{}'", s));
        let (first, last) = match s.trim().split_once('-') {
            Some((first, last)) => (first, last),
            None => (s.trim(), s.trim()),
        };
        let first = first.trim().parse::<u32>().map_err(|_| invalid())?;
        let last = last.trim().parse::<u32>().map_err(|_| invalid())?;
        if first == 0 || last < first {
            return Err(invalid());
        }
        Ok(Self { first, last })
    }
}

//=========================================================================================
// Remote Content (read-only)
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevelationPlace {
    Meccan,
    Medinan,
}

/// A chapter (surah) of the text.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: u32,
    pub name_simple: String,
    pub name_arabic: String,
    pub translated_name: String,
    pub verses_count: u32,
    pub revelation_place: RevelationPlace,
}

/// A section (juz). There are thirty of them, covering the whole text.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub juz_number: u32,
    pub verses_count: u32,
    pub first_verse_key: VerseKey,
    pub last_verse_key: VerseKey,
    /// Chapter id to the range of its verses that fall inside this section.
    pub verse_mapping: BTreeMap<u32, VerseRange>,
}

impl Section {
    /// Ids of the chapters this section spans, ascending.
    pub fn chapter_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.verse_mapping.keys().copied()
    }
}

/// A chapter as listed inside a section's detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterSummary {
    pub chapter_id: u32,
    pub name: String,
    pub name_arabic: String,
    pub translation: String,
    pub verse_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verse {
    pub verse_key: VerseKey,
    /// 1-based position within the chapter.
    pub verse_number: u32,
    pub text: String,
    /// Translation with footnote markup removed.
    pub translation_text: String,
    pub transliteration_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_records: u32,
}

/// One page of a section's verses.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionVerses {
    pub verses: Vec<Verse>,
    pub pagination: Pagination,
}

impl SectionVerses {
    /// Groups the page's verses by chapter id, keeping their order inside each chapter.
    pub fn group_by_chapter(&self) -> BTreeMap<u32, Vec<Verse>> {
        let mut grouped: BTreeMap<u32, Vec<Verse>> = BTreeMap::new();
        for verse in &self.verses {
            grouped
                .entry(verse.verse_key.chapter_id)
                .or_default()
                .push(verse.clone());
        }
        grouped
    }
}

/// Everything a chapter reading view needs, joined from four remote sources.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterDetail {
    pub chapter: Chapter,
    pub verses: Vec<Verse>,
    pub translations: Vec<String>,
    pub transliterations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reciter {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterAudio {
    pub audio_url: String,
}

/// A verse of an alternate translation edition.
#[derive(Debug, Clone, PartialEq)]
pub struct EditionVerse {
    pub verse_key: VerseKey,
    pub text: String,
}

//=========================================================================================
// Local Reading Progress
//=========================================================================================

/// A verse the user has bookmarked. Identified by its `VerseKey`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub chapter_id: u32,
    pub verse_number: u32,
    pub chapter_name: String,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn key(&self) -> VerseKey {
        VerseKey::new(self.chapter_id, self.verse_number)
    }
}

/// The single "where did I stop" pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct LastRead {
    pub chapter_id: u32,
    pub verse_number: u32,
    pub chapter_name: String,
    pub updated_at: DateTime<Utc>,
}

impl LastRead {
    pub fn key(&self) -> VerseKey {
        VerseKey::new(self.chapter_id, self.verse_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_key_parses_and_formats() {
        let key: VerseKey = "2:255".parse().unwrap();
        assert_eq!(key, VerseKey::new(2, 255));
        assert_eq!(key.to_string(), "2:255");
    }

    #[test]
    fn verse_key_rejects_malformed_input() {
        for raw in ["", "2", "2:", ":5", "a:b", "0:1", "1:0", "1:2:3"] {
            assert_eq!(
                raw.parse::<VerseKey>(),
                Err(PortError::InvalidVerseKey(raw.to_string())),
                "input {:?}",
                raw
            );
        }
    }

    #[test]
    fn verse_range_accepts_single_verse_and_span() {
        assert_eq!("1-7".parse::<VerseRange>().unwrap(), VerseRange { first: 1, last: 7 });
        assert_eq!("9".parse::<VerseRange>().unwrap(), VerseRange { first: 9, last: 9 });
        assert!("7-1".parse::<VerseRange>().is_err());
        assert!("x-2".parse::<VerseRange>().is_err());
    }
}
