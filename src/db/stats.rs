//! Persisted XP counters, one row per user.
//!
//! XP is display state, not authoritative: it is written best-effort after
//! every answer and may lag item progress when a write fails.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XpSummary {
  pub points: i64,
  pub streak: i64,
  pub max_streak: i64,
}

pub fn load_xp(conn: &Connection, user_id: &str) -> Result<Option<XpSummary>> {
  conn
    .query_row(
      "SELECT points, streak, max_streak FROM xp WHERE user_id = ?1",
      [user_id],
      |row| {
        Ok(XpSummary {
          points: row.get(0)?,
          streak: row.get(1)?,
          max_streak: row.get(2)?,
        })
      },
    )
    .optional()
}

pub fn save_xp(conn: &Connection, user_id: &str, xp: &XpSummary) -> Result<()> {
  conn.execute(
    r#"
    INSERT INTO xp (user_id, points, streak, max_streak, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT (user_id) DO UPDATE SET
      points = excluded.points,
      streak = excluded.streak,
      max_streak = excluded.max_streak,
      updated_at = excluded.updated_at
    "#,
    params![user_id, xp.points, xp.streak, xp.max_streak, Utc::now().to_rfc3339()],
  )?;
  Ok(())
}
