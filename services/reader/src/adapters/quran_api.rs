//! services/reader/src/adapters/quran_api.rs
//!
//! This module contains the adapter for the remote chapter/verse/recitation API.
//! It implements the `ContentService` port from the `core` crate using `reqwest`.

use async_trait::async_trait;
use quran_reader_core::catalog::{assemble_chapter_verses, chapters_in_section, dedup_sections};
use quran_reader_core::domain::{
    Chapter, ChapterAudio, ChapterDetail, ChapterSummary, EditionVerse, Reciter, Section,
    SectionVerses, VerseKey,
};
use quran_reader_core::ports::{ContentService, PortError, PortResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::markup::{strip_footnotes, strip_markup};
use super::records::{
    AudioFileEnvelope, ChapterEnvelope, ChapterRecord, ChaptersEnvelope, EditionEnvelope,
    RecitationsEnvelope, SectionRecord, SectionVerseRecord, SectionVersesEnvelope,
    SectionsEnvelope, TranslationsEnvelope, UthmaniEnvelope,
};

/// Where and what to request from the remote content API.
#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub base_url: String,
    /// Secondary feed serving whole alternate translation editions.
    pub edition_base_url: String,
    pub translation_id: u32,
    pub transliteration_id: u32,
    pub language: String,
    pub section_page_size: u32,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `ContentService` port over HTTP.
///
/// Stateless apart from the shared `reqwest::Client`; nothing is cached.
#[derive(Clone)]
pub struct QuranApiAdapter {
    client: Client,
    settings: ContentSettings,
}

impl QuranApiAdapter {
    /// Creates a new `QuranApiAdapter`.
    pub fn new(client: Client, settings: ContentSettings) -> Self {
        Self { client, settings }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// Issues a GET and decodes the JSON body.
    ///
    /// Transport errors, non-success statuses and undecodable bodies all become
    /// `RemoteUnavailable`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> PortResult<T> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| remote_unavailable(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "content API returned an error status");
            return Err(PortError::RemoteUnavailable(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| remote_unavailable(url, e))
    }

    async fn fetch_chapter(&self, chapter_id: u32) -> PortResult<Chapter> {
        let envelope: ChapterEnvelope = self
            .get_json(&self.url(&format!("/chapters/{}", chapter_id)), &[])
            .await?;
        envelope.chapter.to_domain()
    }

    async fn fetch_chapter_text(&self, chapter_id: u32) -> PortResult<Vec<String>> {
        let envelope: UthmaniEnvelope = self
            .get_json(
                &self.url("/quran/verses/uthmani"),
                &[("chapter_number", chapter_id.to_string())],
            )
            .await?;
        Ok(envelope.verses.into_iter().map(|v| v.text_uthmani).collect())
    }

    async fn fetch_translation(
        &self,
        resource_id: u32,
        chapter_id: u32,
    ) -> PortResult<Vec<String>> {
        let envelope: TranslationsEnvelope = self
            .get_json(
                &self.url(&format!("/quran/translations/{}", resource_id)),
                &[("chapter_number", chapter_id.to_string())],
            )
            .await?;
        Ok(envelope.translations.into_iter().map(|t| t.text).collect())
    }
}

fn remote_unavailable(url: &str, error: reqwest::Error) -> PortError {
    warn!(url, %error, "content API request failed");
    PortError::RemoteUnavailable(format!("{}: {}", url, error))
}

//=========================================================================================
// `ContentService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentService for QuranApiAdapter {
    async fn list_chapters(&self) -> PortResult<Vec<Chapter>> {
        let envelope: ChaptersEnvelope = self.get_json(&self.url("/chapters"), &[]).await?;
        envelope
            .chapters
            .into_iter()
            .map(ChapterRecord::to_domain)
            .collect()
    }

    async fn list_sections(&self) -> PortResult<Vec<Section>> {
        let envelope: SectionsEnvelope = self.get_json(&self.url("/juzs"), &[]).await?;
        let received = envelope.juzs.len();
        // Repeats are dropped before validation; only first occurrences are trusted.
        let records = dedup_sections(envelope.juzs, |record| record.juz_number);
        if records.len() != received {
            debug!(
                received,
                kept = records.len(),
                "dropped repeated section records"
            );
        }
        records.into_iter().map(SectionRecord::to_domain).collect()
    }

    async fn list_chapters_in_section(&self, juz_number: u32) -> Vec<ChapterSummary> {
        let sections = match self.list_sections().await {
            Ok(sections) => sections,
            Err(e) => {
                warn!(juz_number, error = %e, "could not list sections; showing no chapters");
                return Vec::new();
            }
        };
        if !sections.iter().any(|s| s.juz_number == juz_number) {
            debug!(juz_number, "no such section");
            return Vec::new();
        }
        match self.list_chapters().await {
            Ok(chapters) => chapters_in_section(&sections, juz_number, &chapters),
            Err(e) => {
                warn!(juz_number, error = %e, "could not list chapters; showing no chapters");
                Vec::new()
            }
        }
    }

    async fn get_section_verses(&self, juz_number: u32, page: u32) -> PortResult<SectionVerses> {
        let query = [
            ("language", self.settings.language.clone()),
            ("words", "false".to_string()),
            ("translations", self.settings.translation_id.to_string()),
            ("per_page", self.settings.section_page_size.to_string()),
            ("page", page.max(1).to_string()),
            ("fields", "text_uthmani,verse_key".to_string()),
        ];
        let envelope: SectionVersesEnvelope = self
            .get_json(&self.url(&format!("/verses/by_juz/{}", juz_number)), &query)
            .await?;

        let verses = envelope
            .verses
            .into_iter()
            .map(SectionVerseRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;
        Ok(SectionVerses {
            verses,
            pagination: envelope.pagination.to_domain(),
        })
    }

    async fn get_chapter_detail(&self, chapter_id: u32) -> PortResult<ChapterDetail> {
        let (chapter, texts, translations, transliterations) = futures::try_join!(
            self.fetch_chapter(chapter_id),
            self.fetch_chapter_text(chapter_id),
            self.fetch_translation(self.settings.translation_id, chapter_id),
            self.fetch_translation(self.settings.transliteration_id, chapter_id),
        )?;

        let translations: Vec<String> = translations.iter().map(|t| strip_footnotes(t)).collect();
        let verses = assemble_chapter_verses(&chapter, texts, &translations, &transliterations)
            .inspect_err(|e| warn!(chapter_id, error = %e, "chapter sources disagree"))?;

        Ok(ChapterDetail {
            chapter,
            verses,
            translations,
            transliterations,
        })
    }

    async fn list_reciters(&self) -> PortResult<Vec<Reciter>> {
        let envelope: RecitationsEnvelope = self
            .get_json(&self.url("/resources/recitations"), &[])
            .await?;
        Ok(envelope
            .recitations
            .into_iter()
            .map(|r| r.to_domain())
            .collect())
    }

    async fn get_chapter_audio(
        &self,
        reciter_id: u32,
        chapter_id: u32,
    ) -> PortResult<ChapterAudio> {
        let envelope: AudioFileEnvelope = self
            .get_json(
                &self.url(&format!("/chapter_recitations/{}/{}", reciter_id, chapter_id)),
                &[],
            )
            .await?;
        Ok(envelope.audio_file.to_domain())
    }

    async fn get_verse_translation(&self, verse_key: VerseKey) -> PortResult<Option<String>> {
        let envelope: TranslationsEnvelope = self
            .get_json(
                &self.url(&format!(
                    "/quran/translations/{}",
                    self.settings.translation_id
                )),
                &[("verse_key", verse_key.to_string())],
            )
            .await?;
        Ok(envelope
            .translations
            .into_iter()
            .next()
            .map(|t| strip_markup(&t.text)))
    }

    async fn get_edition_translation(&self, edition: &str) -> PortResult<Vec<EditionVerse>> {
        let url = format!(
            "{}/quran/{}",
            self.settings.edition_base_url.trim_end_matches('/'),
            edition
        );
        let envelope: EditionEnvelope = self.get_json(&url, &[]).await?;
        Ok(envelope.to_domain())
    }
}
