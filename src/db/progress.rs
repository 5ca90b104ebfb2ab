//! Per-item progress snapshots keyed by (user, band, item).
//!
//! Writes are full-snapshot upserts after every answer, last-write-wins.
//! XP lives in its own table (stats.rs) and is persisted independently, so
//! the two can drift if a write fails mid-sequence; callers log and move on.

use chrono::Utc;
use rusqlite::{params, Connection, Result};
use std::collections::HashMap;

use crate::domain::ItemProgress;
use crate::drill::ProgressStore;

use super::{try_lock, DbPool, LogOnError};

pub fn load_progress(
  conn: &Connection,
  user_id: &str,
  band_id: &str,
) -> Result<HashMap<String, ItemProgress>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT item_id, mastery_count, last_asked_turn
    FROM item_progress
    WHERE user_id = ?1 AND band_id = ?2
    "#,
  )?;

  let rows = stmt.query_map(params![user_id, band_id], |row| {
    let item_id: String = row.get(0)?;
    let mastery_count: u32 = row.get(1)?;
    let last_asked_turn: Option<i64> = row.get(2)?;
    Ok((
      item_id,
      ItemProgress {
        mastery_count,
        last_asked_turn,
      },
    ))
  })?;

  rows.collect()
}

pub fn save_progress(
  conn: &Connection,
  user_id: &str,
  band_id: &str,
  snapshot: &HashMap<String, ItemProgress>,
) -> Result<()> {
  let now = Utc::now().to_rfc3339();
  let mut stmt = conn.prepare(
    r#"
    INSERT INTO item_progress (user_id, band_id, item_id, mastery_count, last_asked_turn, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT (user_id, band_id, item_id) DO UPDATE SET
      mastery_count = excluded.mastery_count,
      last_asked_turn = excluded.last_asked_turn,
      updated_at = excluded.updated_at
    "#,
  )?;

  for (item_id, progress) in snapshot {
    stmt.execute(params![
      user_id,
      band_id,
      item_id,
      progress.mastery_count,
      progress.last_asked_turn,
      now,
    ])?;
  }

  Ok(())
}

/// Clear a band's snapshot for a user (the explicit progress-reset action).
/// Returns the number of rows removed.
pub fn reset_progress(conn: &Connection, user_id: &str, band_id: &str) -> Result<usize> {
  conn.execute(
    "DELETE FROM item_progress WHERE user_id = ?1 AND band_id = ?2",
    params![user_id, band_id],
  )
}

/// SQLite-backed implementation of the engine's progress port.
/// Failures degrade to empty loads and dropped saves, logged at warn.
pub struct SqliteProgressStore {
  pool: DbPool,
}

impl SqliteProgressStore {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }
}

impl ProgressStore for SqliteProgressStore {
  fn load(&self, user_id: &str, band_id: &str) -> HashMap<String, ItemProgress> {
    let Some(conn) = try_lock(&self.pool).log_warn("Progress load: lock failed") else {
      return HashMap::new();
    };
    load_progress(&conn, user_id, band_id).log_warn_default("Failed to load progress")
  }

  fn save(&self, user_id: &str, band_id: &str, snapshot: &HashMap<String, ItemProgress>) {
    let Some(conn) = try_lock(&self.pool).log_warn("Progress save: lock failed") else {
      return;
    };
    let _ = save_progress(&conn, user_id, band_id, snapshot).log_warn("Failed to save progress");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;

  fn snapshot(entries: &[(&str, u32, Option<i64>)]) -> HashMap<String, ItemProgress> {
    entries
      .iter()
      .map(|(id, mastery_count, last_asked_turn)| {
        (
          id.to_string(),
          ItemProgress {
            mastery_count: *mastery_count,
            last_asked_turn: *last_asked_turn,
          },
        )
      })
      .collect()
  }

  #[test]
  fn test_save_load_roundtrip() {
    let env = TestEnv::new().expect("test env");
    let snap = snapshot(&[("w1", 2, Some(5)), ("w2", 0, None)]);

    save_progress(&env.conn, "dana", "unit1", &snap).expect("save");
    let loaded = load_progress(&env.conn, "dana", "unit1").expect("load");

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded["w1"].mastery_count, 2);
    assert_eq!(loaded["w1"].last_asked_turn, Some(5));
    assert_eq!(loaded["w2"].last_asked_turn, None);
  }

  #[test]
  fn test_save_is_last_write_wins() {
    let env = TestEnv::new().expect("test env");

    save_progress(&env.conn, "dana", "unit1", &snapshot(&[("w1", 1, Some(1))])).expect("save");
    save_progress(&env.conn, "dana", "unit1", &snapshot(&[("w1", 2, Some(4))])).expect("save");

    let loaded = load_progress(&env.conn, "dana", "unit1").expect("load");
    assert_eq!(loaded["w1"].mastery_count, 2);
    assert_eq!(loaded["w1"].last_asked_turn, Some(4));
  }

  #[test]
  fn test_progress_is_scoped_per_user_and_band() {
    let env = TestEnv::new().expect("test env");

    save_progress(&env.conn, "dana", "unit1", &snapshot(&[("w1", 3, Some(9))])).expect("save");
    save_progress(&env.conn, "dana", "unit2", &snapshot(&[("w1", 1, Some(2))])).expect("save");
    save_progress(&env.conn, "omer", "unit1", &snapshot(&[("w1", 0, None)])).expect("save");

    assert_eq!(
      load_progress(&env.conn, "dana", "unit1").expect("load")["w1"].mastery_count,
      3
    );
    assert_eq!(
      load_progress(&env.conn, "dana", "unit2").expect("load")["w1"].mastery_count,
      1
    );
    assert_eq!(
      load_progress(&env.conn, "omer", "unit1").expect("load")["w1"].mastery_count,
      0
    );
  }

  #[test]
  fn test_reset_progress() {
    let env = TestEnv::new().expect("test env");
    save_progress(&env.conn, "dana", "unit1", &snapshot(&[("w1", 2, Some(3))])).expect("save");
    save_progress(&env.conn, "dana", "unit2", &snapshot(&[("w1", 1, Some(1))])).expect("save");

    let removed = reset_progress(&env.conn, "dana", "unit1").expect("reset");
    assert_eq!(removed, 1);
    assert!(load_progress(&env.conn, "dana", "unit1").expect("load").is_empty());
    // Other bands untouched
    assert_eq!(load_progress(&env.conn, "dana", "unit2").expect("load").len(), 1);
  }

  #[test]
  fn test_load_unknown_band_is_empty() {
    let env = TestEnv::new().expect("test env");
    assert!(load_progress(&env.conn, "dana", "nope").expect("load").is_empty());
  }
}
