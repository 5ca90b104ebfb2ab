//! Answer evaluation with fuzzy bilingual matching.
//!
//! Grades a free-text submission against a canonical Hebrew answer that may
//! list several accepted variants ("כלב / כלבה"). The cascade runs from the
//! strictest rule to the loosest: exact match, per-variant match, synonym
//! expansion, typo tolerance, containment, then a global fuzzy check that
//! awards partial credit only.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Synonym table
// ============================================================================

/// Common confusable words and phrases in both languages. Entries are
/// directed here; the compiled map inserts the reverse edge for every pair,
/// so navigability in both directions holds by construction.
static SYNONYMS: &[(&str, &[&str])] = &[
  // English -> Hebrew
  ("upset", &["עצוב", "עצבני"]),
  // Hebrew reciprocal entries
  ("עצוב", &["עצבני", "ממורמר", "נעלב"]),
  ("עצבני", &["עצוב", "כועס"]),
  ("שדה תעופה", &["נמל תעופה"]),
  ("נמל תעופה", &["שדה תעופה"]),
  ("בריכה", &["בריכת שחייה"]),
  // Chat-related variants (Hebrew variants and common spellings)
  (
    "chat",
    &[
      "לשוחח",
      "לשוחח בצ'אט",
      "לשוחח בצאט",
      "לצ'טט",
      "לטקסט",
      "לדבר בצ'אט",
      "להתכתב",
      "להתכתב בצאט",
    ],
  ),
  ("לשוחח", &["לצ'טט", "לדבר בצ'אט", "להתכתב", "לשוחח בצ'אט"]),
  ("לצ'טט", &["לשוחח", "לדבר בצ'אט", "להתכתב"]),
  // "Be crazy about" and common Hebrew equivalents
  (
    "be crazy about",
    &["למות על", "להשתגע על", "משוגע על", "מאוד אוהב", "אוהב מאוד"],
  ),
  ("למות על", &["להשתגע על", "משוגע על", "be crazy about", "love"]),
  ("להשתגע על", &["למות על", "משוגע על", "be crazy about"]),
  ("מת על", &["למות על", "להשתגע על", "be crazy about", "love"]),
];

/// Normalized synonym map, symmetric by construction.
static SYNONYM_MAP: LazyLock<HashMap<String, HashSet<String>>> = LazyLock::new(|| {
  let mut map: HashMap<String, HashSet<String>> = HashMap::new();
  let mut link = |a: String, b: String| {
    if a.is_empty() || b.is_empty() || a == b {
      return;
    }
    map.entry(a.clone()).or_default().insert(b.clone());
    map.entry(b).or_default().insert(a);
  };
  for (term, equivalents) in SYNONYMS {
    let key = normalize_answer(term);
    for equivalent in *equivalents {
      link(key.clone(), normalize_answer(equivalent));
    }
  }
  map
});

// ============================================================================
// Result types
// ============================================================================

/// Quality classification of a submitted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerQuality {
  /// Full credit: matched the canonical answer, a variant, or a synonym
  Exact,
  /// Partial credit: a spelling-level miss on the full answer
  Close,
  Wrong,
}

impl AnswerQuality {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Exact => "exact",
      Self::Close => "close",
      Self::Wrong => "wrong",
    }
  }

  pub fn is_exact(&self) -> bool {
    matches!(self, Self::Exact)
  }

  /// Exact and close answers both earn points; only exact advances mastery
  pub fn awards_points(&self) -> bool {
    !matches!(self, Self::Wrong)
  }
}

/// Rule subset the evaluator runs with. Grammar exercises disable the
/// loose rules; everything else is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
  /// Accept a variant contained in the answer (or vice versa) as exact
  pub containment: bool,
  /// Grade near misses on the full canonical string as Close
  pub close_tier: bool,
}

impl MatchPolicy {
  pub const fn standard() -> Self {
    Self {
      containment: true,
      close_tier: true,
    }
  }

  pub const fn strict() -> Self {
    Self {
      containment: false,
      close_tier: false,
    }
  }
}

// ============================================================================
// Normalization
// ============================================================================

fn is_kept_char(c: char) -> bool {
  c.is_ascii_digit() || c.is_ascii_alphabetic() || ('\u{0590}'..='\u{05FF}').contains(&c) || c.is_whitespace()
}

/// Normalize Hebrew/English text for comparison:
/// - NFC fold, trim, lowercase
/// - keep only digits, Latin letters, Hebrew letters and whitespace
/// - collapse whitespace runs
/// - strip a leading Hebrew definite article ה
/// - strip common plural/feminine suffixes (ים, ות, ה) to fold onto a base form
pub fn normalize_answer(input: &str) -> String {
  let lowered: String = input.nfc().collect::<String>().to_lowercase();
  let filtered: String = lowered.chars().filter(|c| is_kept_char(*c)).collect();
  let mut text = filtered.split_whitespace().collect::<Vec<_>>().join(" ");

  let mut chars: Vec<char> = text.chars().collect();
  if chars.len() > 2 && chars[0] == 'ה' {
    chars.remove(0);
    text = chars.iter().collect();
  }

  let len = chars.len();
  if len > 3 && (text.ends_with("ים") || text.ends_with("ות")) {
    text = chars[..len - 2].iter().collect();
  } else if len > 2 && text.ends_with('ה') {
    text = chars[..len - 1].iter().collect();
  }

  text
}

/// A term plus its table synonyms, all normalized.
fn expand_with_synonyms(term: &str) -> HashSet<String> {
  let key = normalize_answer(term);
  let mut expanded = HashSet::new();
  if let Some(synonyms) = SYNONYM_MAP.get(&key) {
    expanded.extend(synonyms.iter().cloned());
  }
  expanded.insert(key);
  expanded
}

/// Split a raw canonical answer into accepted variants. Splitting happens
/// before normalization because normalization strips the delimiters.
pub fn split_variants(canonical_answer: &str) -> Vec<&str> {
  canonical_answer
    .split(['/', ',', ';', '-'])
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect()
}

// ============================================================================
// Edit distance
// ============================================================================

/// Simple Levenshtein distance between two strings
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
  let a_chars: Vec<char> = a.chars().collect();
  let b_chars: Vec<char> = b.chars().collect();
  let a_len = a_chars.len();
  let b_len = b_chars.len();

  if a_len == 0 {
    return b_len;
  }
  if b_len == 0 {
    return a_len;
  }

  let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];

  for (i, row) in matrix.iter_mut().enumerate() {
    row[0] = i;
  }
  for j in 0..=b_len {
    matrix[0][j] = j;
  }

  for i in 1..=a_len {
    for j in 1..=b_len {
      let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
      matrix[i][j] = (matrix[i - 1][j] + 1)
        .min(matrix[i][j - 1] + 1)
        .min(matrix[i - 1][j - 1] + cost);
    }
  }

  matrix[a_len][b_len]
}

// ============================================================================
// Classification
// ============================================================================

/// Grade a free-text submission against a canonical answer.
pub fn classify_answer(
  user_answer: &str,
  canonical_answer: &str,
  policy: MatchPolicy,
) -> AnswerQuality {
  let clean_user = normalize_answer(user_answer);
  if clean_user.is_empty() {
    return AnswerQuality::Wrong;
  }

  let clean_correct = normalize_answer(canonical_answer);

  // Exact match to the full string
  if clean_user == clean_correct {
    return AnswerQuality::Exact;
  }

  for raw_variant in split_variants(canonical_answer) {
    let variant = normalize_answer(raw_variant);
    if variant.is_empty() {
      continue;
    }

    if clean_user == variant {
      return AnswerQuality::Exact;
    }

    // Known synonyms for this variant
    if expand_with_synonyms(raw_variant).contains(&clean_user) {
      return AnswerQuality::Exact;
    }

    // Typo tolerance: ~20% of the variant length, at least one edit
    let distance = levenshtein_distance(&clean_user, &variant);
    let allowed_errors = (variant.chars().count() / 5).max(1);
    if distance <= allowed_errors {
      return AnswerQuality::Exact;
    }

    if policy.containment {
      // "זה נשמע מעניין" for "מעניין": answer includes the variant
      if variant.chars().count() >= 2 && clean_user.contains(variant.as_str()) {
        return AnswerQuality::Exact;
      }
      // "נשמע" for "נשמע מעניין": partial answer contained in the variant
      if clean_user.chars().count() >= 2 && variant.contains(clean_user.as_str()) {
        return AnswerQuality::Exact;
      }
    }

    // The user's own synonyms may match this variant
    if expand_with_synonyms(&clean_user).contains(&variant) {
      return AnswerQuality::Exact;
    }
  }

  // Global fuzzy check against the full canonical string: ~30% tolerance,
  // at least two edits. Looser than the per-variant rule, so it only
  // awards partial credit.
  if policy.close_tier {
    let distance = levenshtein_distance(&clean_user, &clean_correct);
    let allowed_errors = (clean_correct.chars().count() * 3 / 10).max(2);
    if distance <= allowed_errors {
      return AnswerQuality::Close;
    }
  }

  AnswerQuality::Wrong
}

#[cfg(test)]
mod tests {
  use super::*;

  fn classify(user: &str, canonical: &str) -> AnswerQuality {
    classify_answer(user, canonical, MatchPolicy::standard())
  }

  #[test]
  fn test_exact_match() {
    assert_eq!(classify("כלב", "כלב"), AnswerQuality::Exact);
    assert_eq!(classify("dog", "dog"), AnswerQuality::Exact);
    assert_eq!(classify("  כלב  ", "כלב"), AnswerQuality::Exact);
  }

  #[test]
  fn test_self_match_after_normalization() {
    for s in ["שלום", "בית ספר", "Dog", "לצ'טט"] {
      assert_eq!(classify(s, s), AnswerQuality::Exact, "self-match failed for {s}");
    }
  }

  #[test]
  fn test_empty_answer_is_wrong() {
    assert_eq!(classify("", "כלב"), AnswerQuality::Wrong);
    assert_eq!(classify("   ", "כלב"), AnswerQuality::Wrong);
    // Only stripped characters normalize to empty
    assert_eq!(classify("?!...", "כלב"), AnswerQuality::Wrong);
  }

  #[test]
  fn test_case_insensitive() {
    assert_eq!(classify("DOG", "dog"), AnswerQuality::Exact);
    assert_eq!(classify("Dog", "DOG"), AnswerQuality::Exact);
  }

  #[test]
  fn test_variant_match() {
    assert_eq!(classify("כלב", "כלב / כלבה"), AnswerQuality::Exact);
    assert_eq!(classify("כלבה", "כלב / כלבה"), AnswerQuality::Exact);
    assert_eq!(classify("sound", "Sound, Noise"), AnswerQuality::Exact);
    assert_eq!(classify("noise", "Sound, Noise"), AnswerQuality::Exact);
  }

  #[test]
  fn test_variant_delimiters() {
    assert_eq!(classify("רעש", "קול; רעש"), AnswerQuality::Exact);
    assert_eq!(classify("קול", "קול - רעש"), AnswerQuality::Exact);
  }

  #[test]
  fn test_definite_article_stripped() {
    assert_eq!(classify("הכלב", "כלב"), AnswerQuality::Exact);
    assert_eq!(classify("כלב", "הכלב"), AnswerQuality::Exact);
  }

  #[test]
  fn test_plural_suffix_folding() {
    // "כלבים" folds to "כלב" and matches either variant's base form
    assert_eq!(classify("כלבים", "כלב / כלבה"), AnswerQuality::Exact);
    assert_eq!(classify("מכוניות", "מכונית"), AnswerQuality::Exact);
  }

  #[test]
  fn test_typo_within_tolerance_is_exact() {
    // 4-char variant allows a single edit
    assert_eq!(classify("שלוס", "שלום"), AnswerQuality::Exact);
    assert_eq!(classify("helo", "hello"), AnswerQuality::Exact);
  }

  #[test]
  fn test_synonyms_match_both_directions() {
    assert_eq!(classify("עצוב", "upset"), AnswerQuality::Exact);
    assert_eq!(classify("upset", "עצוב"), AnswerQuality::Exact);
    assert_eq!(classify("נמל תעופה", "שדה תעופה"), AnswerQuality::Exact);
    assert_eq!(classify("שדה תעופה", "נמל תעופה"), AnswerQuality::Exact);
  }

  #[test]
  fn test_synonym_map_is_symmetric() {
    for (term, equivalents) in SYNONYMS {
      let key = normalize_answer(term);
      for equivalent in *equivalents {
        let other = normalize_answer(equivalent);
        if key == other {
          continue;
        }
        assert!(
          SYNONYM_MAP.get(&key).is_some_and(|s| s.contains(&other)),
          "missing forward edge {key} -> {other}"
        );
        assert!(
          SYNONYM_MAP.get(&other).is_some_and(|s| s.contains(&key)),
          "missing reverse edge {other} -> {key}"
        );
      }
    }
  }

  #[test]
  fn test_containment_both_directions() {
    // Answer wraps the variant
    assert_eq!(classify("זה נשמע מעניין", "מעניין"), AnswerQuality::Exact);
    // Partial answer contained in the variant
    assert_eq!(classify("נשמע", "נשמע מעניין"), AnswerQuality::Exact);
  }

  #[test]
  fn test_containment_requires_two_chars() {
    // A single stray letter occurring inside the variant must not pass
    assert_eq!(classify("ל", "כלב גדול"), AnswerQuality::Wrong);
  }

  #[test]
  fn test_global_fuzzy_is_close_not_exact() {
    // Two substitutions on a 9-char answer: outside the per-variant
    // tolerance (1) and not a substring, inside the global tolerance (2)
    assert_eq!(classify("מבשח נייד", "מחשב נייד"), AnswerQuality::Close);
  }

  #[test]
  fn test_wrong_answer() {
    assert_eq!(classify("חתול", "כלב"), AnswerQuality::Wrong);
    assert_eq!(classify("completely unrelated", "כלב"), AnswerQuality::Wrong);
  }

  #[test]
  fn test_strict_policy_disables_close_tier() {
    let strict = MatchPolicy::strict();
    assert_eq!(
      classify_answer("מבשח נייד", "מחשב נייד", strict),
      AnswerQuality::Wrong
    );
    // Typo tolerance still applies under strict
    assert_eq!(classify_answer("שלוס", "שלום", strict), AnswerQuality::Exact);
  }

  #[test]
  fn test_strict_policy_disables_containment() {
    let strict = MatchPolicy::strict();
    assert_eq!(
      classify_answer("זה נשמע מעניין", "מעניין", strict),
      AnswerQuality::Wrong
    );
  }

  #[test]
  fn test_first_matching_variant_wins() {
    // Both variants would match; no ranking happens across them
    assert_eq!(classify("כלב", "כלב / כלב גדול"), AnswerQuality::Exact);
  }

  #[test]
  fn test_normalize_strips_punctuation_and_collapses_whitespace() {
    assert_eq!(normalize_answer("נמל תעופה/"), normalize_answer("נמל  תעופה"));
    assert_eq!(normalize_answer("dog!"), "dog");
  }

  #[test]
  fn test_normalize_keeps_short_words_intact() {
    // Suffix stripping has length guards; two-letter words survive
    assert_eq!(normalize_answer("ים"), "ים");
    assert_eq!(normalize_answer("זה"), "זה");
  }

  #[test]
  fn test_levenshtein() {
    assert_eq!(levenshtein_distance("cat", "cat"), 0);
    assert_eq!(levenshtein_distance("cat", "bat"), 1);
    assert_eq!(levenshtein_distance("cat", "cars"), 2);
    assert_eq!(levenshtein_distance("", "abc"), 3);
    assert_eq!(levenshtein_distance("שלום", "שלוס"), 1);
  }

  #[test]
  fn test_split_variants() {
    assert_eq!(split_variants("כלב / כלבה"), vec!["כלב", "כלבה"]);
    assert_eq!(split_variants("a, b; c - d"), vec!["a", "b", "c", "d"]);
    assert_eq!(split_variants("one"), vec!["one"]);
  }

  #[test]
  fn test_quality_accessors() {
    assert!(AnswerQuality::Exact.is_exact());
    assert!(!AnswerQuality::Close.is_exact());
    assert!(AnswerQuality::Exact.awards_points());
    assert!(AnswerQuality::Close.awards_points());
    assert!(!AnswerQuality::Wrong.awards_points());
    assert_eq!(AnswerQuality::Close.as_str(), "close");
  }
}
