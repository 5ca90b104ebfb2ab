use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Create tables with COMPLETE schema for new databases
  // Migrations below handle upgrades for existing databases
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS item_progress (
      user_id TEXT NOT NULL,
      band_id TEXT NOT NULL,
      item_id TEXT NOT NULL,
      mastery_count INTEGER NOT NULL DEFAULT 0,
      last_asked_turn INTEGER,
      updated_at TEXT NOT NULL,
      PRIMARY KEY (user_id, band_id, item_id)
    );

    CREATE TABLE IF NOT EXISTS xp (
      user_id TEXT PRIMARY KEY,
      points INTEGER NOT NULL DEFAULT 0,
      streak INTEGER NOT NULL DEFAULT 0,
      max_streak INTEGER NOT NULL DEFAULT 0,
      updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_item_progress_user_band ON item_progress(user_id, band_id);
    "#,
  )?;

  // Migration: max_streak arrived after the first deployments
  add_column_if_missing(conn, "xp", "max_streak", "INTEGER NOT NULL DEFAULT 0")?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  let query = format!("SELECT COUNT(*) FROM pragma_table_info('{}') WHERE name = ?1", table);
  conn
    .query_row(&query, [column], |row| row.get::<_, i64>(0))
    .map(|count| count > 0)
    .unwrap_or(false)
}

/// Add a column to a table if it doesn't already exist
fn add_column_if_missing(
  conn: &Connection,
  table: &str,
  column: &str,
  definition: &str,
) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition),
      [],
    )?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_migrations_are_idempotent() {
    let conn = Connection::open_in_memory().expect("open");
    run_migrations(&conn).expect("first run");
    run_migrations(&conn).expect("second run");
  }

  #[test]
  fn test_column_exists() {
    let conn = Connection::open_in_memory().expect("open");
    run_migrations(&conn).expect("migrations");
    assert!(column_exists(&conn, "xp", "max_streak"));
    assert!(!column_exists(&conn, "xp", "nonexistent"));
  }
}
