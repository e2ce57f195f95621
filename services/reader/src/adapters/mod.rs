pub mod markup;
pub mod progress;
pub mod quran_api;
pub mod records;
pub mod storage;

pub use progress::LocalProgressStore;
pub use quran_api::{ContentSettings, QuranApiAdapter};
pub use storage::{FileStorage, MemoryStorage};
