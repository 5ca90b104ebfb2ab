//! Project path functions - single source of truth for all file paths.
//!
//! This module centralizes path definitions to avoid hardcoded strings
//! scattered throughout the codebase.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! This allows running isolated server instances for E2E testing:
//! ```bash
//! DATA_DIR=data/test/drill cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database path (progress and XP snapshots)
pub fn db_path() -> String {
    format!("{}/milim.db", data_dir())
}

/// Directory holding practice band JSON files
pub fn bands_dir() -> String {
    format!("{}/bands", data_dir())
}

// ==================== Tests ====================
