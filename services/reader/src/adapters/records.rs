//! services/reader/src/adapters/records.rs
//!
//! "Impure" JSON record structs mirroring the remote content API's responses.
//! Each record converts into its pure domain counterpart, rejecting shapes the
//! core cannot trust.

use std::collections::{BTreeMap, HashMap};

use quran_reader_core::catalog::section_bounds;
use quran_reader_core::domain::{
    Chapter, ChapterAudio, EditionVerse, Pagination, Reciter, RevelationPlace, Section, Verse,
    VerseKey, VerseRange,
};
use quran_reader_core::ports::{PortError, PortResult};
use serde::Deserialize;

use super::markup::{strip_footnotes, strip_markup};

fn malformed(what: impl std::fmt::Display) -> PortError {
    PortError::RemoteUnavailable(format!("malformed response: {}", what))
}

//=========================================================================================
// Chapters
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct ChaptersEnvelope {
    pub chapters: Vec<ChapterRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ChapterEnvelope {
    pub chapter: ChapterRecord,
}

#[derive(Debug, Deserialize)]
pub struct TranslatedNameRecord {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChapterRecord {
    pub id: u32,
    pub name_simple: String,
    pub name_arabic: String,
    pub translated_name: TranslatedNameRecord,
    pub verses_count: u32,
    pub revelation_place: String,
}

impl ChapterRecord {
    pub fn to_domain(self) -> PortResult<Chapter> {
        let revelation_place = match self.revelation_place.to_ascii_lowercase().as_str() {
            "makkah" | "meccan" | "mecca" => RevelationPlace::Meccan,
            "madinah" | "medinan" | "medina" => RevelationPlace::Medinan,
            other => {
                return Err(malformed(format!(
                    "chapter {} has unknown revelation place '{}'",
                    self.id, other
                )))
            }
        };
        if self.id == 0 || self.verses_count == 0 {
            return Err(malformed(format!("chapter {} has no verses", self.id)));
        }
        Ok(Chapter {
            id: self.id,
            name_simple: self.name_simple,
            name_arabic: self.name_arabic,
            translated_name: self.translated_name.name,
            verses_count: self.verses_count,
            revelation_place,
        })
    }
}

//=========================================================================================
// Sections
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct SectionsEnvelope {
    pub juzs: Vec<SectionRecord>,
}

/// The raw `first_verse_id`/`last_verse_id` fields are global indices and are
/// not read; the bounds come from `verse_mapping`.
#[derive(Debug, Deserialize)]
pub struct SectionRecord {
    pub juz_number: u32,
    pub verses_count: u32,
    pub verse_mapping: HashMap<String, String>,
}

impl SectionRecord {
    pub fn to_domain(self) -> PortResult<Section> {
        let mut verse_mapping = BTreeMap::new();
        for (chapter, range) in &self.verse_mapping {
            let chapter_id = chapter.trim().parse::<u32>().map_err(|_| {
                malformed(format!(
                    "section {} maps unknown chapter '{}'",
                    self.juz_number, chapter
                ))
            })?;
            let range = range.parse::<VerseRange>().map_err(|e| {
                malformed(format!("section {}: {}", self.juz_number, e))
            })?;
            verse_mapping.insert(chapter_id, range);
        }
        let (first_verse_key, last_verse_key) = section_bounds(&verse_mapping)
            .ok_or_else(|| malformed(format!("section {} spans no chapters", self.juz_number)))?;

        Ok(Section {
            juz_number: self.juz_number,
            verses_count: self.verses_count,
            first_verse_key,
            last_verse_key,
            verse_mapping,
        })
    }
}

//=========================================================================================
// Verses by Section
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct SectionVersesEnvelope {
    pub verses: Vec<SectionVerseRecord>,
    pub pagination: PaginationRecord,
}

#[derive(Debug, Deserialize)]
pub struct SectionVerseRecord {
    pub verse_key: String,
    #[serde(default)]
    pub text_uthmani: String,
    #[serde(default)]
    pub translations: Vec<TranslationRecord>,
}

impl SectionVerseRecord {
    /// Section pages span several chapters, so the position comes from the key.
    pub fn to_domain(self) -> PortResult<Verse> {
        let verse_key: VerseKey = self
            .verse_key
            .parse()
            .map_err(|e: PortError| malformed(e))?;
        let translation_text = self
            .translations
            .into_iter()
            .next()
            .map(|t| strip_footnotes(&t.text))
            .unwrap_or_default();
        Ok(Verse {
            verse_key,
            verse_number: verse_key.verse_number,
            text: self.text_uthmani,
            translation_text,
            transliteration_text: None,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PaginationRecord {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_records: u32,
}

impl PaginationRecord {
    pub fn to_domain(self) -> Pagination {
        Pagination {
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_records: self.total_records,
        }
    }
}

//=========================================================================================
// Per-Chapter Text Sources
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct UthmaniEnvelope {
    pub verses: Vec<UthmaniRecord>,
}

#[derive(Debug, Deserialize)]
pub struct UthmaniRecord {
    pub text_uthmani: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslationsEnvelope {
    pub translations: Vec<TranslationRecord>,
}

#[derive(Debug, Deserialize)]
pub struct TranslationRecord {
    pub text: String,
}

//=========================================================================================
// Recitations
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct RecitationsEnvelope {
    pub recitations: Vec<RecitationRecord>,
}

#[derive(Debug, Deserialize)]
pub struct RecitationRecord {
    pub id: u32,
    pub reciter_name: String,
    #[serde(default)]
    pub style: Option<String>,
}

impl RecitationRecord {
    pub fn to_domain(self) -> Reciter {
        let name = match self.style {
            Some(style) if !style.is_empty() => format!("{} ({})", self.reciter_name, style),
            _ => self.reciter_name,
        };
        Reciter { id: self.id, name }
    }
}

#[derive(Debug, Deserialize)]
pub struct AudioFileEnvelope {
    pub audio_file: AudioFileRecord,
}

#[derive(Debug, Deserialize)]
pub struct AudioFileRecord {
    pub audio_url: String,
}

impl AudioFileRecord {
    pub fn to_domain(self) -> ChapterAudio {
        ChapterAudio {
            audio_url: self.audio_url,
        }
    }
}

//=========================================================================================
// Alternate Translation Edition (secondary feed)
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct EditionEnvelope {
    pub data: EditionData,
}

#[derive(Debug, Deserialize)]
pub struct EditionData {
    pub surahs: Vec<EditionChapterRecord>,
}

#[derive(Debug, Deserialize)]
pub struct EditionChapterRecord {
    pub number: u32,
    pub ayahs: Vec<EditionVerseRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditionVerseRecord {
    pub number_in_surah: u32,
    pub text: String,
}

impl EditionEnvelope {
    pub fn to_domain(self) -> Vec<EditionVerse> {
        self.data
            .surahs
            .into_iter()
            .flat_map(|chapter| {
                let chapter_id = chapter.number;
                chapter.ayahs.into_iter().map(move |ayah| EditionVerse {
                    verse_key: VerseKey::new(chapter_id, ayah.number_in_surah),
                    text: strip_markup(&ayah.text),
                })
            })
            .collect()
    }
}
