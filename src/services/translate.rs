//! Best-effort Hebrew translation for sentence reveals.
//!
//! When a student misses a fill-in-the-blank sentence, the completed
//! sentence is sent to a translation endpoint and whatever comes back is
//! shown next to the revealed answer. Failures never surface: the caller
//! gets a local phrase-table rendering or a static fallback string instead.
//! Scoring never waits on any of this.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shown when no translation could be produced
pub const TRANSLATION_FALLBACK: &str = "לא ניתן לתרגם כרגע";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

/// Local phrase table used when the endpoint is unreachable or unset.
/// Longer phrases sit first so they win over their own fragments.
static LOCAL_PHRASES: &[(&str, &str)] = &[
  ("has changed the way we communicate", "שינתה את הדרך שבה אנו מתקשרים"),
  ("we communicate", "אנו מתקשרים"),
  ("has changed", "שינתה"),
  ("the way", "את הדרך"),
  ("communicate", "מתקשרים"),
  ("technology", "טכנולוגיה"),
  ("modern", "מודרני"),
  ("we", "אנו"),
];

#[derive(Serialize)]
struct TranslateRequest<'a> {
  #[serde(rename = "type")]
  kind: &'a str,
  content: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
  #[serde(default)]
  translation: String,
}

/// HTTP client for the translation endpoint. With no endpoint configured
/// the client degrades straight to the local table.
pub struct TranslationClient {
  http: reqwest::Client,
  endpoint: Option<String>,
}

impl TranslationClient {
  pub fn new(endpoint: Option<String>) -> Self {
    let http = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()
      .unwrap_or_default();
    Self { http, endpoint }
  }

  /// Translate a sentence, or None when the endpoint is unset, errors, or
  /// returns an empty body.
  pub async fn translate(&self, sentence: &str) -> Option<String> {
    let endpoint = self.endpoint.as_deref()?;
    match self.request(endpoint, sentence).await {
      Ok(translation) if !translation.trim().is_empty() => Some(translation),
      Ok(_) => None,
      Err(e) => {
        tracing::warn!("Translation request failed: {}", e);
        None
      }
    }
  }

  async fn request(&self, endpoint: &str, sentence: &str) -> Result<String, reqwest::Error> {
    let response = self
      .http
      .post(endpoint)
      .json(&TranslateRequest {
        kind: "translate",
        content: sentence,
      })
      .send()
      .await?
      .error_for_status()?;

    let body: TranslateResponse = response.json().await?;
    Ok(body.translation)
  }

  /// Translation for the reveal path: endpoint result, else the local
  /// phrase table, else the static fallback string.
  pub async fn reveal_translation(&self, sentence: &str) -> String {
    if let Some(translation) = self.translate(sentence).await {
      return translation;
    }

    let local = local_translate(sentence);
    if local != sentence {
      local
    } else {
      TRANSLATION_FALLBACK.to_string()
    }
  }
}

/// Replace every underscore run in a prompt with the canonical answer,
/// producing the completed sentence for translation and display.
pub fn fill_blanks(prompt: &str, answer: &str) -> String {
  let mut out = String::with_capacity(prompt.len() + answer.len());
  let mut in_blank = false;
  for c in prompt.chars() {
    if c == '_' {
      if !in_blank {
        out.push(' ');
        out.push_str(answer);
        out.push(' ');
        in_blank = true;
      }
    } else {
      in_blank = false;
      out.push(c);
    }
  }
  out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Heuristic offline rendering: substitute known phrases, longest first.
pub fn local_translate(text: &str) -> String {
  let mut out = text.to_string();
  for (english, hebrew) in LOCAL_PHRASES {
    out = replace_ignore_case(&out, english, hebrew);
  }
  out
}

fn replace_ignore_case(haystack: &str, needle: &str, replacement: &str) -> String {
  let lower_haystack = haystack.to_lowercase();
  let lower_needle = needle.to_lowercase();
  if lower_needle.is_empty() {
    return haystack.to_string();
  }

  let mut out = String::with_capacity(haystack.len());
  let mut cursor = 0;
  while let Some(found) = lower_haystack[cursor..].find(&lower_needle) {
    let start = cursor + found;
    out.push_str(&haystack[cursor..start]);
    out.push_str(replacement);
    cursor = start + lower_needle.len();
  }
  out.push_str(&haystack[cursor..]);
  out
}
