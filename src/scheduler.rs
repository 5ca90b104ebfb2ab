//! Item selection with spacing between repeats.
//!
//! A simplified spaced-repetition policy: mastered items leave the pool,
//! recently asked items sit out for a few turns, and selection among the
//! remaining candidates is uniform. When the pool is small or nearly
//! exhausted the spacing rule yields rather than block progress.

use rand::Rng;

use crate::config::DrillSettings;
use crate::domain::PracticeItem;

/// Items still below the mastery threshold.
pub fn incomplete_items<'a>(
  pool: &'a [PracticeItem],
  settings: &DrillSettings,
) -> Vec<&'a PracticeItem> {
  pool
    .iter()
    .filter(|item| !item.is_mastered(settings.mastery_threshold))
    .collect()
}

/// Deterministic candidate set for the next turn.
///
/// Returns an empty vec only when every item is mastered (session complete).
pub fn eligible_candidates<'a>(
  pool: &'a [PracticeItem],
  current_turn: i64,
  settings: &DrillSettings,
) -> Vec<&'a PracticeItem> {
  let incomplete = incomplete_items(pool, settings);
  if incomplete.is_empty() {
    return incomplete;
  }

  // Spacing only applies when the pool is big enough to allow it
  if incomplete.len() as i64 > settings.spacing_buffer {
    let spaced: Vec<&PracticeItem> = incomplete
      .iter()
      .copied()
      .filter(|item| {
        let last_turn = item.last_asked_turn.unwrap_or(-1);
        current_turn - last_turn > settings.spacing_buffer
      })
      .collect();
    if !spaced.is_empty() {
      return spaced;
    }
    // Everything was asked recently; never block progress
  }

  incomplete
}

/// Pick the next item to present, or None once every item is mastered.
/// Repeated calls on a fully mastered pool keep returning None.
pub fn pick_next<'a>(
  pool: &'a [PracticeItem],
  current_turn: i64,
  settings: &DrillSettings,
) -> Option<&'a PracticeItem> {
  let candidates = eligible_candidates(pool, current_turn, settings);
  if candidates.is_empty() {
    return None;
  }

  let idx = rand::rng().random_range(0..candidates.len());
  Some(candidates[idx])
}
