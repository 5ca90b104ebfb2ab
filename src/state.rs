//! Application state shared across handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DrillSettings;
use crate::db::DbPool;
use crate::services::TranslationClient;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared progress/XP database
    pub pool: DbPool,

    /// Directory holding practice band JSON files
    pub bands_dir: PathBuf,

    /// Best-effort sentence translation for reveals
    pub translator: Arc<TranslationClient>,

    /// Pacing knobs for the drill loop
    pub settings: DrillSettings,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        bands_dir: PathBuf,
        translator: TranslationClient,
        settings: DrillSettings,
    ) -> Self {
        Self {
            pool,
            bands_dir,
            translator: Arc::new(translator),
            settings,
        }
    }
}
