//! Turn engine for a drill session.
//!
//! Grades one submission, updates the answered item and the session
//! counters, and produces the feedback the UI renders. The engine is pure
//! over in-memory state; persistence goes through the [`ProgressStore`]
//! port at the call site.

use std::collections::HashMap;

use crate::config::{DrillSettings, POINTS_PER_ANSWER};
use crate::domain::{ItemProgress, PracticeItem};
use crate::session::DrillSession;
use crate::validation::{classify_answer, AnswerQuality};

/// One user submission: typed text, or a selected option index for
/// multiple-choice items.
#[derive(Debug, Clone)]
pub enum Submission {
  Text(String),
  Choice(usize),
}

/// What the UI needs to render after grading a submission.
#[derive(Debug, Clone)]
pub struct Feedback {
  pub quality: AnswerQuality,
  pub canonical_answer: String,
  pub mastery_count: u32,
  /// The answered item reached the threshold with this submission
  pub mastered: bool,
}

/// Storage port for per-item progress snapshots. Implementations swallow
/// their own failures (log and degrade); the engine never sees them.
pub trait ProgressStore {
  /// Saved progress for a (user, band) pair; empty on any failure.
  fn load(&self, user_id: &str, band_id: &str) -> HashMap<String, ItemProgress>;
  /// Persist a full snapshot, last-write-wins.
  fn save(&self, user_id: &str, band_id: &str, snapshot: &HashMap<String, ItemProgress>);
}

/// Grade a submission against the named item and advance the session.
///
/// Returns None when the item id is not in the pool (stale form resubmit
/// after a band switch); nothing is mutated in that case.
pub fn apply_answer(
  pool: &mut [PracticeItem],
  item_id: &str,
  submission: &Submission,
  session: &mut DrillSession,
  settings: &DrillSettings,
) -> Option<Feedback> {
  let item = pool.iter_mut().find(|item| item.id == item_id)?;

  let quality = match submission {
    Submission::Choice(index) => {
      // Closed choices grade by index equality; no fuzzy tier
      if item.correct_choice_index == Some(*index) {
        AnswerQuality::Exact
      } else {
        AnswerQuality::Wrong
      }
    }
    Submission::Text(answer) => {
      classify_answer(answer, &item.canonical_answer, item.profile.policy())
    }
  };

  let next_turn = session.turn_count + 1;
  session.turn_count = next_turn;

  if quality.is_exact() {
    item.record_exact(settings.mastery_threshold);
  }
  item.last_asked_turn = Some(next_turn);

  match quality {
    AnswerQuality::Exact => {
      session.points += POINTS_PER_ANSWER;
      session.streak += 1;
      session.max_streak = session.max_streak.max(session.streak);
    }
    AnswerQuality::Close => {
      // Partial credit still earns points but breaks the streak
      session.points += POINTS_PER_ANSWER;
      session.streak = 0;
    }
    AnswerQuality::Wrong => {
      session.streak = 0;
    }
  }

  // Choice-only items may omit the canonical text; reveal the correct
  // option instead
  let canonical_answer = if item.canonical_answer.is_empty() {
    item
      .correct_choice_index
      .and_then(|i| item.choices.get(i))
      .cloned()
      .unwrap_or_default()
  } else {
    item.canonical_answer.clone()
  };

  Some(Feedback {
    quality,
    canonical_answer,
    mastery_count: item.mastery_count,
    mastered: item.is_mastered(settings.mastery_threshold),
  })
}

/// Snapshot the pool for persistence.
pub fn progress_snapshot(pool: &[PracticeItem]) -> HashMap<String, ItemProgress> {
  pool
    .iter()
    .map(|item| (item.id.clone(), ItemProgress::of(item)))
    .collect()
}

/// Overlay saved progress onto a freshly loaded pool, matching by item id.
/// Items without a saved entry keep their loaded counters.
pub fn merge_progress(pool: &mut [PracticeItem], saved: &HashMap<String, ItemProgress>) {
  for item in pool.iter_mut() {
    if let Some(progress) = saved.get(&item.id) {
      item.mastery_count = progress.mastery_count;
      item.last_asked_turn = progress.last_asked_turn;
    }
  }
}
