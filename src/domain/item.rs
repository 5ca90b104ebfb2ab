use serde::{Deserialize, Serialize};

use crate::validation::MatchPolicy;

/// Matching profile for an item.
/// Grammar drills (past tense etc.) require near-exact answers; vocabulary
/// drills tolerate containment and award partial credit for close misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchProfile {
  #[default]
  Standard,
  Strict,
}

impl MatchProfile {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Standard => "standard",
      Self::Strict => "strict",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "standard" => Some(Self::Standard),
      "strict" => Some(Self::Strict),
      _ => None,
    }
  }

  pub fn policy(&self) -> MatchPolicy {
    match self {
      Self::Standard => MatchPolicy::standard(),
      Self::Strict => MatchPolicy::strict(),
    }
  }
}

/// A single question unit: a word-translation pair or a fill-in-the-blank
/// sentence, with mastery tracking for the current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeItem {
  /// Stable identifier, unique within its band
  pub id: String,
  /// English text to display; sentence items carry a blank marker ("___")
  /// and may end with a parenthetical part-of-speech tag
  pub prompt: String,
  /// Hebrew answer; may list several accepted variants joined by / , ; -
  pub canonical_answer: String,
  /// Exact answers accumulated this session (0..=threshold)
  pub mastery_count: u32,
  /// Turn index at which this item was last presented
  pub last_asked_turn: Option<i64>,
  /// Multiple choice options (empty for free-text items)
  pub choices: Vec<String>,
  /// Index of the correct option within `choices`
  pub correct_choice_index: Option<usize>,
  /// Which matching policy grades this item
  pub profile: MatchProfile,
}

impl PracticeItem {
  pub fn new(id: String, prompt: String, canonical_answer: String) -> Self {
    Self {
      id,
      prompt,
      canonical_answer,
      mastery_count: 0,
      last_asked_turn: None,
      choices: Vec::new(),
      correct_choice_index: None,
      profile: MatchProfile::Standard,
    }
  }

  /// Sentence items carry an underscore run marking the blank to fill.
  pub fn is_sentence(&self) -> bool {
    self.prompt.contains('_')
  }

  pub fn is_multiple_choice(&self) -> bool {
    !self.choices.is_empty() && self.correct_choice_index.is_some()
  }

  pub fn is_mastered(&self, threshold: u32) -> bool {
    self.mastery_count >= threshold
  }

  /// Record an exact answer. The counter never exceeds the threshold.
  pub fn record_exact(&mut self, threshold: u32) {
    self.mastery_count = (self.mastery_count + 1).min(threshold);
  }
}

/// Persisted per-item progress, keyed by item id under (user, band).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemProgress {
  pub mastery_count: u32,
  pub last_asked_turn: Option<i64>,
}

impl ItemProgress {
  pub fn of(item: &PracticeItem) -> Self {
    Self {
      mastery_count: item.mastery_count,
      last_asked_turn: item.last_asked_turn,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(id: &str, prompt: &str, answer: &str) -> PracticeItem {
    PracticeItem::new(id.to_string(), prompt.to_string(), answer.to_string())
  }

  #[test]
  fn test_match_profile_roundtrip() {
    for profile in [MatchProfile::Standard, MatchProfile::Strict] {
      assert_eq!(MatchProfile::from_str(profile.as_str()), Some(profile));
    }
    assert_eq!(MatchProfile::from_str("fuzzy"), None);
  }

  #[test]
  fn test_match_profile_default_is_standard() {
    assert_eq!(MatchProfile::default(), MatchProfile::Standard);
  }

  #[test]
  fn test_sentence_detection() {
    assert!(item("s1", "Technology ___ the way we live.", "שינתה").is_sentence());
    assert!(!item("w1", "dog", "כלב").is_sentence());
  }

  #[test]
  fn test_multiple_choice_detection() {
    let mut it = item("m1", "choose", "בחר");
    assert!(!it.is_multiple_choice());

    it.choices = vec!["a".into(), "b".into()];
    // Options without a correct index are not a valid closed question
    assert!(!it.is_multiple_choice());

    it.correct_choice_index = Some(1);
    assert!(it.is_multiple_choice());
  }

  #[test]
  fn test_record_exact_caps_at_threshold() {
    let mut it = item("w1", "dog", "כלב");
    for _ in 0..5 {
      it.record_exact(3);
    }
    assert_eq!(it.mastery_count, 3);
    assert!(it.is_mastered(3));
  }

  #[test]
  fn test_record_exact_increments_by_one() {
    let mut it = item("w1", "dog", "כלב");
    it.record_exact(3);
    assert_eq!(it.mastery_count, 1);
    assert!(!it.is_mastered(3));
  }

  #[test]
  fn test_item_progress_of() {
    let mut it = item("w1", "dog", "כלב");
    it.mastery_count = 2;
    it.last_asked_turn = Some(7);

    let progress = ItemProgress::of(&it);
    assert_eq!(progress.mastery_count, 2);
    assert_eq!(progress.last_asked_turn, Some(7));
  }
}
