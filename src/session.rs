//! Simple in-memory session storage for drill sessions.
//!
//! Stores DrillSession state keyed by session ID (from cookie).
//! Sessions auto-expire after a configurable duration of inactivity.

use crate::config;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

/// Volatile per-student counters for the active drill. Best-effort copies
/// land in the XP table; this map is the source of truth for the turn index.
#[derive(Debug, Clone, Default)]
pub struct DrillSession {
  /// Band the session is drilling
  pub band_id: String,
  /// Monotonic turn index, incremented once per submitted answer
  pub turn_count: i64,
  pub points: i64,
  pub streak: i64,
  pub max_streak: i64,
}

impl DrillSession {
  pub fn new(band_id: &str) -> Self {
    Self {
      band_id: band_id.to_string(),
      ..Self::default()
    }
  }
}

/// Session entry with last access time for expiration
struct SessionEntry {
  session: DrillSession,
  last_access: DateTime<Utc>,
}

/// Global session store
static SESSIONS: LazyLock<Mutex<HashMap<String, SessionEntry>>> =
  LazyLock::new(|| Mutex::new(HashMap::new()));

/// Get the session for the given ID, if one is active.
pub fn get_session(session_id: &str) -> Option<DrillSession> {
  let mut sessions = SESSIONS.lock().expect("Session store lock poisoned");

  // Clean up expired sessions occasionally (~10% chance)
  if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
    cleanup_expired(&mut sessions);
  }

  sessions.get_mut(session_id).map(|entry| {
    entry.last_access = Utc::now();
    entry.session.clone()
  })
}

/// Insert or replace a session
pub fn update_session(session_id: &str, session: DrillSession) {
  let mut sessions = SESSIONS.lock().expect("Session store lock poisoned");
  sessions.insert(
    session_id.to_string(),
    SessionEntry {
      session,
      last_access: Utc::now(),
    },
  );
}

/// Clean up expired sessions
fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>) {
  let expiry = Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS);
  sessions.retain(|_, entry| entry.last_access > expiry);
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}
