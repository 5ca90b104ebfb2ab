//! Application configuration constants.
//!
//! This module centralizes all configurable values that were previously
//! hardcoded throughout the codebase.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== File Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    translate: Option<TranslateConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateConfig {
    url: Option<String>,
}

fn read_config() -> Option<AppConfig> {
    let contents = std::fs::read_to_string("config.toml").ok()?;
    toml::from_str::<AppConfig>(&contents).ok()
}

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Priority 1: config.toml
    if let Some(config) = read_config() {
        if let Some(path) = config.database.and_then(|db| db.path) {
            tracing::info!("Using database from config.toml: {}", path);
            return PathBuf::from(path);
        }
    }

    // Priority 2: .env DATABASE_PATH
    if let Ok(path) = std::env::var("DATABASE_PATH") {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    // Default
    let default = PathBuf::from(crate::paths::db_path());
    tracing::info!("Using default database path: {}", default.display());
    default
}

/// Translation endpoint with priority: config.toml > .env > none (offline fallback only)
pub fn translate_endpoint() -> Option<String> {
    let _ = dotenvy::dotenv();

    if let Some(config) = read_config() {
        if let Some(url) = config.translate.and_then(|t| t.url) {
            return Some(url);
        }
    }

    std::env::var("TRANSLATE_URL").ok()
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, SERVER_PORT)
}

// ==================== Session Configuration ====================

/// Drill session expiration time in hours
pub const SESSION_EXPIRY_HOURS: i64 = 1;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

/// Sign-in cookie lifetime in days
pub const SIGN_IN_COOKIE_DAYS: i64 = 30;

// ==================== Drill Configuration ====================

/// Exact answers required before an item is considered mastered
pub const MASTERY_THRESHOLD: u32 = 3;

/// Minimum turns before an already-asked item may be asked again
pub const SPACING_BUFFER: i64 = 2;

/// Points awarded for an exact or close answer
pub const POINTS_PER_ANSWER: i64 = 10;

/// Pacing knobs for the drill scheduler, passed to selection and the
/// turn engine so exercise types can diverge without code changes.
#[derive(Debug, Clone, Copy)]
pub struct DrillSettings {
    pub mastery_threshold: u32,
    pub spacing_buffer: i64,
}

impl Default for DrillSettings {
    fn default() -> Self {
        Self {
            mastery_threshold: MASTERY_THRESHOLD,
            spacing_buffer: SPACING_BUFFER,
        }
    }
}
