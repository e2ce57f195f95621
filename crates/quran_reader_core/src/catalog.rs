//! crates/quran_reader_core/src/catalog.rs
//!
//! Pure normalization rules applied to remote content before it reaches a view:
//! one record per section number, section-to-chapter projection, and positional
//! assembly of a chapter's verses from independently fetched lists.

use std::collections::{BTreeMap, HashSet};

use crate::domain::{Chapter, ChapterSummary, Section, Verse, VerseKey, VerseRange};
use crate::ports::{PortError, PortResult};

/// Keeps the first occurrence of each section number, in input order.
///
/// Generic over the record type so raw remote records can be thinned out
/// before any of them is validated.
pub fn dedup_sections<T>(sections: Vec<T>, juz_number: impl Fn(&T) -> u32) -> Vec<T> {
    let mut seen = HashSet::new();
    sections
        .into_iter()
        .filter(|section| seen.insert(juz_number(section)))
        .collect()
}

/// The first and last verse covered by a section's chapter-range mapping.
pub fn section_bounds(mapping: &BTreeMap<u32, VerseRange>) -> Option<(VerseKey, VerseKey)> {
    let (first_chapter, first_range) = mapping.iter().next()?;
    let (last_chapter, last_range) = mapping.iter().next_back()?;
    Some((
        VerseKey::new(*first_chapter, first_range.first),
        VerseKey::new(*last_chapter, last_range.last),
    ))
}

/// Projects the chapters spanned by section `juz_number`, in the chapter list's order.
///
/// An unknown section yields an empty list.
pub fn chapters_in_section(
    sections: &[Section],
    juz_number: u32,
    chapters: &[Chapter],
) -> Vec<ChapterSummary> {
    let Some(section) = sections.iter().find(|s| s.juz_number == juz_number) else {
        return Vec::new();
    };
    let ids: HashSet<u32> = section.chapter_ids().collect();

    chapters
        .iter()
        .filter(|chapter| ids.contains(&chapter.id))
        .map(|chapter| ChapterSummary {
            chapter_id: chapter.id,
            name: chapter.name_simple.clone(),
            name_arabic: chapter.name_arabic.clone(),
            translation: chapter.translated_name.clone(),
            verse_count: chapter.verses_count,
        })
        .collect()
}

/// Zips a chapter's original text, translation and transliteration by position.
///
/// `verse_number` is the 1-based index in the lists. All three lists must have
/// exactly `chapter.verses_count` entries; otherwise the positions cannot be
/// trusted and the whole chapter is rejected.
pub fn assemble_chapter_verses(
    chapter: &Chapter,
    texts: Vec<String>,
    translations: &[String],
    transliterations: &[String],
) -> PortResult<Vec<Verse>> {
    let expected = chapter.verses_count as usize;
    for (source, len) in [
        ("original text", texts.len()),
        ("translation", translations.len()),
        ("transliteration", transliterations.len()),
    ] {
        if len != expected {
            return Err(PortError::RemoteUnavailable(format!(
                "chapter {} declares {} verses but the {} source returned {}",
                chapter.id, expected, source, len
            )));
        }
    }

    let verses = texts
        .into_iter()
        .zip(translations.iter().zip(transliterations))
        .enumerate()
        .map(|(index, (text, (translation, transliteration)))| {
            let verse_number = index as u32 + 1;
            Verse {
                verse_key: VerseKey::new(chapter.id, verse_number),
                verse_number,
                text,
                translation_text: translation.clone(),
                transliteration_text: Some(transliteration.clone()),
            }
        })
        .collect();
    Ok(verses)
}
