//! Practice band loading and discovery.
//!
//! A band is a JSON file of word pairs or fill-in-the-blank sentences,
//! dropped into the bands directory. Accepted item shapes follow the
//! authoring format the classroom already uses: `english`/`hebrew` (or the
//! short `en`/`he`), an optional stable `id`, an optional `successCount`
//! carried over from exports, and optional multiple-choice fields.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::domain::{MatchProfile, PracticeItem};

/// Filename prefix marking grammar bands that grade with the strict policy
const STRICT_BAND_PREFIX: &str = "past_";

#[derive(Debug, Deserialize)]
struct RawBandItem {
  #[serde(default)]
  id: Option<String>,
  #[serde(default, alias = "en")]
  english: String,
  #[serde(default, alias = "he")]
  hebrew: String,
  #[serde(default, rename = "successCount")]
  success_count: u32,
  #[serde(default)]
  options: Vec<String>,
  #[serde(default, rename = "correctIndex")]
  correct_index: Option<usize>,
}

/// A loaded practice band, ready to merge with saved progress.
#[derive(Debug, Clone)]
pub struct Band {
  pub id: String,
  pub title: String,
  pub profile: MatchProfile,
  pub items: Vec<PracticeItem>,
}

/// Listing entry for the band picker.
#[derive(Debug, Clone)]
pub struct BandSummary {
  pub id: String,
  pub filename: String,
  pub title: String,
}

#[derive(Debug)]
pub enum BandError {
  NotFound(String),
  InvalidName(String),
  Io(String, String),
  Parse(String, String),
  Empty(String),
}

impl std::fmt::Display for BandError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      BandError::NotFound(id) => write!(f, "Band not found: {}", id),
      BandError::InvalidName(name) => write!(f, "Invalid band filename: {}", name),
      BandError::Io(path, err) => write!(f, "IO error reading {}: {}", path, err),
      BandError::Parse(path, err) => write!(f, "Parse error in {}: {}", path, err),
      BandError::Empty(id) => write!(f, "Band {} has no usable items", id),
    }
  }
}

impl std::error::Error for BandError {}

/// Band id derived from the filename, without the .json extension.
pub fn band_id_from_filename(filename: &str) -> String {
  filename.strip_suffix(".json").unwrap_or(filename).to_string()
}

fn band_title(band_id: &str) -> String {
  band_id.replace('_', " ")
}

/// Reject anything that could escape the bands directory.
fn is_safe_filename(filename: &str) -> bool {
  !filename.is_empty()
    && !filename.contains(['/', '\\'])
    && !filename.starts_with('.')
}

/// Load a band file from the bands directory.
pub fn load_band(bands_dir: &Path, filename: &str) -> Result<Band, BandError> {
  if !is_safe_filename(filename) {
    return Err(BandError::InvalidName(filename.to_string()));
  }

  let band_id = band_id_from_filename(filename);
  let path = bands_dir.join(format!("{band_id}.json"));
  if !path.exists() {
    return Err(BandError::NotFound(band_id));
  }

  let contents = fs::read_to_string(&path)
    .map_err(|e| BandError::Io(path.display().to_string(), e.to_string()))?;
  let raw_items: Vec<RawBandItem> = serde_json::from_str(&contents)
    .map_err(|e| BandError::Parse(path.display().to_string(), e.to_string()))?;

  let profile = if band_id.starts_with(STRICT_BAND_PREFIX) {
    MatchProfile::Strict
  } else {
    MatchProfile::Standard
  };

  let mut items = Vec::with_capacity(raw_items.len());
  for (index, raw) in raw_items.into_iter().enumerate() {
    if raw.english.trim().is_empty() {
      tracing::warn!("Skipping item {index} in {band_id}: empty prompt");
      continue;
    }
    if raw.hebrew.trim().is_empty() && raw.options.is_empty() {
      tracing::warn!("Skipping item {index} in {band_id}: no answer");
      continue;
    }

    // Missing ids are assigned deterministically so saved progress keeps
    // matching across reloads
    let id = raw
      .id
      .filter(|id| !id.trim().is_empty())
      .unwrap_or_else(|| format!("{band_id}-{index}"));

    let mut item = PracticeItem::new(id, raw.english, raw.hebrew);
    item.mastery_count = raw.success_count;
    item.choices = raw.options;
    item.correct_choice_index = raw.correct_index.filter(|i| *i < item.choices.len());
    item.profile = profile;
    items.push(item);
  }

  if items.is_empty() {
    return Err(BandError::Empty(band_id));
  }

  Ok(Band {
    title: band_title(&band_id),
    id: band_id,
    profile,
    items,
  })
}

/// Discover all band files in a directory, sorted by filename.
/// Unreadable entries are skipped; a missing directory yields an empty list.
pub fn list_bands(bands_dir: &Path) -> Vec<BandSummary> {
  let mut bands = Vec::new();

  let entries = match fs::read_dir(bands_dir) {
    Ok(entries) => entries,
    Err(_) => return bands, // Directory doesn't exist or not readable
  };

  for entry in entries.filter_map(|e| e.ok()) {
    let path = entry.path();
    if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
      continue;
    }
    let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
      continue;
    };
    let id = band_id_from_filename(filename);
    bands.push(BandSummary {
      title: band_title(&id),
      id,
      filename: filename.to_string(),
    });
  }

  bands.sort_by(|a, b| a.filename.cmp(&b.filename));
  bands
}

/// Seed a starter band on first run so the app is usable out of the box.
pub fn seed_starter_band(bands_dir: &Path) -> std::io::Result<()> {
  fs::create_dir_all(bands_dir)?;
  if !list_bands(bands_dir).is_empty() {
    return Ok(());
  }

  let starter = serde_json::json!([
    { "english": "dog", "hebrew": "כלב / כלבה" },
    { "english": "cat", "hebrew": "חתול / חתולה" },
    { "english": "house (n)", "hebrew": "בית" },
    { "english": "school (n)", "hebrew": "בית ספר" },
    { "english": "airport (n)", "hebrew": "שדה תעופה / נמל תעופה" },
    { "english": "upset (adj)", "hebrew": "עצוב / עצבני" },
    { "english": "to chat", "hebrew": "לצ'טט / להתכתב" },
    { "english": "Technology ___ the way we communicate.", "hebrew": "has changed" },
  ]);

  let path = bands_dir.join("starter_words.json");
  fs::write(&path, serde_json::to_string_pretty(&starter)?.as_bytes())?;
  tracing::info!("Seeded starter band at {}", path.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn write_band(dir: &Path, filename: &str, contents: &str) {
    fs::write(dir.join(filename), contents).expect("write band");
  }

  #[test]
  fn test_load_band_full_shape() {
    let temp = TempDir::new().expect("tempdir");
    write_band(
      temp.path(),
      "unit2.json",
      r#"[
        { "id": "w1", "english": "dog", "hebrew": "כלב", "successCount": 2 },
        { "en": "cat", "he": "חתול" }
      ]"#,
    );

    let band = load_band(temp.path(), "unit2.json").expect("load");
    assert_eq!(band.id, "unit2");
    assert_eq!(band.title, "unit2");
    assert_eq!(band.profile, MatchProfile::Standard);
    assert_eq!(band.items.len(), 2);

    assert_eq!(band.items[0].id, "w1");
    assert_eq!(band.items[0].mastery_count, 2);
    // Short aliases and generated ids
    assert_eq!(band.items[1].id, "unit2-1");
    assert_eq!(band.items[1].prompt, "cat");
    assert_eq!(band.items[1].canonical_answer, "חתול");
  }

  #[test]
  fn test_load_band_accepts_bare_id() {
    let temp = TempDir::new().expect("tempdir");
    write_band(temp.path(), "unit2.json", r#"[{ "english": "dog", "hebrew": "כלב" }]"#);

    // Both "unit2" and "unit2.json" resolve to the same file
    assert!(load_band(temp.path(), "unit2").is_ok());
    assert!(load_band(temp.path(), "unit2.json").is_ok());
  }

  #[test]
  fn test_strict_profile_for_past_bands() {
    let temp = TempDir::new().expect("tempdir");
    write_band(
      temp.path(),
      "past_simple.json",
      r#"[{ "english": "He ___ (go) home.", "hebrew": "went" }]"#,
    );

    let band = load_band(temp.path(), "past_simple.json").expect("load");
    assert_eq!(band.profile, MatchProfile::Strict);
    assert_eq!(band.items[0].profile, MatchProfile::Strict);
  }

  #[test]
  fn test_multiple_choice_fields() {
    let temp = TempDir::new().expect("tempdir");
    write_band(
      temp.path(),
      "choices.json",
      r#"[
        { "english": "dog", "hebrew": "כלב", "options": ["חתול", "כלב"], "correctIndex": 1 },
        { "english": "cat", "hebrew": "חתול", "options": ["חתול"], "correctIndex": 5 }
      ]"#,
    );

    let band = load_band(temp.path(), "choices.json").expect("load");
    assert!(band.items[0].is_multiple_choice());
    // Out-of-range index is dropped rather than trusted
    assert!(!band.items[1].is_multiple_choice());
  }

  #[test]
  fn test_invalid_items_are_skipped() {
    let temp = TempDir::new().expect("tempdir");
    write_band(
      temp.path(),
      "unit3.json",
      r#"[
        { "english": "", "hebrew": "כלב" },
        { "english": "dog", "hebrew": "" },
        { "english": "cat", "hebrew": "חתול" }
      ]"#,
    );

    let band = load_band(temp.path(), "unit3.json").expect("load");
    assert_eq!(band.items.len(), 1);
    assert_eq!(band.items[0].prompt, "cat");
  }

  #[test]
  fn test_load_band_errors() {
    let temp = TempDir::new().expect("tempdir");
    write_band(temp.path(), "bad.json", "not json");
    write_band(temp.path(), "empty.json", "[]");

    assert!(matches!(load_band(temp.path(), "missing.json"), Err(BandError::NotFound(_))));
    assert!(matches!(load_band(temp.path(), "bad.json"), Err(BandError::Parse(_, _))));
    assert!(matches!(load_band(temp.path(), "empty.json"), Err(BandError::Empty(_))));
    assert!(matches!(
      load_band(temp.path(), "../etc/passwd"),
      Err(BandError::InvalidName(_))
    ));
  }

  #[test]
  fn test_list_bands_sorted_json_only() {
    let temp = TempDir::new().expect("tempdir");
    write_band(temp.path(), "unit2.json", "[]");
    write_band(temp.path(), "unit1.json", "[]");
    write_band(temp.path(), "notes.txt", "ignore me");

    let bands = list_bands(temp.path());
    let ids: Vec<&str> = bands.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["unit1", "unit2"]);
  }

  #[test]
  fn test_list_bands_missing_dir_is_empty() {
    let temp = TempDir::new().expect("tempdir");
    assert!(list_bands(&temp.path().join("nope")).is_empty());
  }

  #[test]
  fn test_seed_starter_band_once() {
    let temp = TempDir::new().expect("tempdir");
    let dir = temp.path().join("bands");

    seed_starter_band(&dir).expect("seed");
    let first = list_bands(&dir);
    assert_eq!(first.len(), 1);

    // Loads cleanly and mixes word and sentence items
    let band = load_band(&dir, &first[0].filename).expect("load seeded band");
    assert!(band.items.iter().any(|i| i.is_sentence()));
    assert!(band.items.iter().any(|i| !i.is_sentence()));

    // Second seed is a no-op even though a band already exists
    seed_starter_band(&dir).expect("seed again");
    assert_eq!(list_bands(&dir).len(), 1);
  }
}
