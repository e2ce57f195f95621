//! services/reader/src/bin/reader.rs
//!
//! Composition root: wires configuration, logging and both adapters, then
//! reports what the reader would show on its home screen.

use quran_reader_core::ports::{ContentService, ProgressStore};
use reader_lib::{
    adapters::{FileStorage, LocalProgressStore, QuranApiAdapter},
    config::Config,
    error::ReaderError,
};
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ReaderError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded.");

    // --- 2. Initialize Adapters ---
    let mut builder = Client::builder();
    if let Some(timeout) = config.http_timeout {
        builder = builder.timeout(timeout);
    }
    let content: Arc<dyn ContentService> = Arc::new(QuranApiAdapter::new(
        builder.build()?,
        config.content_settings(),
    ));

    let storage = FileStorage::open(&config.storage_dir)?;
    info!("Reading progress stored in {}", storage.dir().display());
    let progress: Arc<dyn ProgressStore> = Arc::new(LocalProgressStore::new(storage));

    // --- 3. Report Local Progress ---
    match progress.get_last_read() {
        Some(last) => info!(
            "Last read: {} {} at {}",
            last.chapter_name, last.key(), last.updated_at
        ),
        None => info!("No last-read position yet."),
    }
    info!("{} bookmark(s) saved.", progress.get_bookmarks().len());

    // --- 4. Fetch the Catalogue ---
    let chapters = content.list_chapters().await?;
    info!("{} chapters available.", chapters.len());

    match content.list_sections().await {
        Ok(sections) => info!("{} sections available.", sections.len()),
        Err(e) => warn!("Sections could not be loaded: {}", e),
    }

    Ok(())
}
