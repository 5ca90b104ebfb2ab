//! Drill loop handlers: start a band, grade submissions, advance.
//!
//! The loop is stateless per request: each handler reloads the band file,
//! overlays the saved snapshot, applies the turn, and persists. Only the
//! turn/score counters live in the in-memory session keyed by cookie.

use askama::Template;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::Form;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::content::{self, Band};
use crate::db::{self, LogOnError, SqliteProgressStore, XpSummary};
use crate::drill::{self, ProgressStore, Submission};
use crate::filters;
use crate::scheduler;
use crate::services::fill_blanks;
use crate::session::{self, DrillSession};
use crate::state::AppState;
use crate::validation::AnswerQuality;

#[derive(Template)]
#[template(path = "drill.html")]
pub struct DrillTemplate {
  pub display_name: String,
  pub band_id: String,
  pub band_title: String,
  pub item_id: String,
  pub prompt: String,
  pub is_sentence: bool,
  pub is_multiple_choice: bool,
  pub choices: Vec<String>,
  pub mastery_count: u32,
  pub mastery_threshold: u32,
  pub done_count: usize,
  pub total_count: usize,
  pub points: i64,
  pub streak: i64,
}

#[derive(Template)]
#[template(path = "feedback.html")]
pub struct FeedbackTemplate {
  pub display_name: String,
  pub band_id: String,
  pub quality: &'static str,
  pub is_exact: bool,
  pub awards_points: bool,
  pub prompt: String,
  pub user_answer: String,
  pub correct_answer: String,
  pub show_reveal: bool,
  pub revealed_translation: Option<String>,
  pub mastery_count: u32,
  pub mastery_threshold: u32,
  pub mastered: bool,
  pub done_count: usize,
  pub total_count: usize,
  pub points: i64,
  pub streak: i64,
}

#[derive(Template)]
#[template(path = "complete.html")]
pub struct CompleteTemplate {
  pub display_name: String,
  pub band_id: String,
  pub band_title: String,
  pub total_count: usize,
  pub points: i64,
  pub max_streak: i64,
}

#[derive(Deserialize)]
pub struct DrillQuery {
  pub band: String,
}

#[derive(Deserialize)]
pub struct AnswerForm {
  pub band_id: String,
  pub item_id: String,
  #[serde(default)]
  pub answer: String,
  #[serde(default)]
  pub choice: Option<usize>,
}

#[derive(Deserialize)]
pub struct NextForm {
  pub band_id: String,
}

/// Load a band and overlay the user's saved snapshot.
fn load_band_with_progress(
  state: &AppState,
  auth: &AuthContext,
  band_ref: &str,
) -> Result<Band, Html<String>> {
  let mut band = content::load_band(&state.bands_dir, band_ref).map_err(|e| {
    tracing::warn!("Failed to load band {}: {}", band_ref, e);
    Html("<p>Band not available. <a href=\"/\">Back to bands</a></p>".to_string())
  })?;

  let store = SqliteProgressStore::new(state.pool.clone());
  drill::merge_progress(&mut band.items, &store.load(&auth.user_id, &band.id));
  Ok(band)
}

/// Session for this cookie and band, seeded from persisted XP when fresh.
fn session_for_band(state: &AppState, auth: &AuthContext, band_id: &str) -> DrillSession {
  if let Some(active) = session::get_session(&auth.session_id) {
    if active.band_id == band_id {
      return active;
    }
  }

  let mut fresh = DrillSession::new(band_id);
  if let Some(conn) = db::try_lock(&state.pool).log_warn("XP load: lock failed") {
    if let Some(xp) = db::load_xp(&conn, &auth.user_id).log_warn_default("Failed to load XP") {
      fresh.points = xp.points;
      fresh.streak = xp.streak;
      fresh.max_streak = xp.max_streak;
    }
  }
  fresh
}

fn persist_xp(state: &AppState, auth: &AuthContext, session: &DrillSession) {
  let Some(conn) = db::try_lock(&state.pool).log_warn("XP save: lock failed") else {
    return;
  };
  let xp = XpSummary {
    points: session.points,
    streak: session.streak,
    max_streak: session.max_streak,
  };
  let _ = db::save_xp(&conn, &auth.user_id, &xp).log_warn("Failed to save XP");
}

fn card_page(
  auth: &AuthContext,
  band: &Band,
  session: &DrillSession,
  item_id: &str,
  threshold: u32,
) -> Html<String> {
  let Some(item) = band.items.iter().find(|i| i.id == item_id) else {
    return Html("<p>Item not found. <a href=\"/\">Back to bands</a></p>".to_string());
  };

  let template = DrillTemplate {
    display_name: auth.display_name.clone(),
    band_id: band.id.clone(),
    band_title: band.title.clone(),
    item_id: item.id.clone(),
    prompt: item.prompt.clone(),
    is_sentence: item.is_sentence(),
    is_multiple_choice: item.is_multiple_choice(),
    choices: item.choices.clone(),
    mastery_count: item.mastery_count,
    mastery_threshold: threshold,
    done_count: band.items.iter().filter(|i| i.is_mastered(threshold)).count(),
    total_count: band.items.len(),
    points: session.points,
    streak: session.streak,
  };
  Html(template.render().unwrap_or_default())
}

fn complete_page(auth: &AuthContext, band: &Band, session: &DrillSession) -> Html<String> {
  let template = CompleteTemplate {
    display_name: auth.display_name.clone(),
    band_id: band.id.clone(),
    band_title: band.title.clone(),
    total_count: band.items.len(),
    points: session.points,
    max_streak: session.max_streak,
  };
  Html(template.render().unwrap_or_default())
}

/// GET /drill?band=X - start (or restart) drilling a band
pub async fn drill_start(
  State(state): State<AppState>,
  auth: AuthContext,
  Query(query): Query<DrillQuery>,
) -> Html<String> {
  let band = match load_band_with_progress(&state, &auth, &query.band) {
    Ok(band) => band,
    Err(page) => return page,
  };

  let session = session_for_band(&state, &auth, &band.id);
  let picked = scheduler::pick_next(&band.items, session.turn_count, &state.settings);
  session::update_session(&auth.session_id, session.clone());

  match picked {
    Some(item) => card_page(&auth, &band, &session, &item.id, state.settings.mastery_threshold),
    None => complete_page(&auth, &band, &session),
  }
}

/// POST /drill/answer - grade one submission
pub async fn drill_answer(
  State(state): State<AppState>,
  auth: AuthContext,
  Form(form): Form<AnswerForm>,
) -> Html<String> {
  let mut band = match load_band_with_progress(&state, &auth, &form.band_id) {
    Ok(band) => band,
    Err(page) => return page,
  };

  let mut session = session_for_band(&state, &auth, &band.id);

  let submission = match form.choice {
    Some(index) => Submission::Choice(index),
    None => Submission::Text(form.answer.clone()),
  };

  let Some(feedback) =
    drill::apply_answer(&mut band.items, &form.item_id, &submission, &mut session, &state.settings)
  else {
    return Html("<p>Item not found. <a href=\"/\">Back to bands</a></p>".to_string());
  };

  // Persist after every answer: snapshot and XP are independent writes,
  // both best-effort
  let store = SqliteProgressStore::new(state.pool.clone());
  store.save(&auth.user_id, &band.id, &drill::progress_snapshot(&band.items));
  persist_xp(&state, &auth, &session);
  session::update_session(&auth.session_id, session.clone());

  // apply_answer found the item, so this lookup cannot miss
  let item = band
    .items
    .iter()
    .find(|i| i.id == form.item_id)
    .expect("answered item present in pool");

  // Wrong sentence answers reveal the completed sentence with a
  // best-effort translation
  let (prompt, revealed_translation) =
    if feedback.quality == AnswerQuality::Wrong && item.is_sentence() {
      let filled = fill_blanks(&item.prompt, &feedback.canonical_answer);
      let translation = state.translator.reveal_translation(&filled).await;
      (filled, Some(translation))
    } else {
      (item.prompt.clone(), None)
    };

  let threshold = state.settings.mastery_threshold;
  let template = FeedbackTemplate {
    display_name: auth.display_name.clone(),
    band_id: band.id.clone(),
    quality: feedback.quality.as_str(),
    is_exact: feedback.quality.is_exact(),
    awards_points: feedback.quality.awards_points(),
    prompt,
    user_answer: form.answer,
    correct_answer: feedback.canonical_answer,
    show_reveal: !feedback.quality.is_exact(),
    revealed_translation,
    mastery_count: feedback.mastery_count,
    mastery_threshold: threshold,
    mastered: feedback.mastered,
    done_count: band.items.iter().filter(|i| i.is_mastered(threshold)).count(),
    total_count: band.items.len(),
    points: session.points,
    streak: session.streak,
  };
  Html(template.render().unwrap_or_default())
}

/// POST /drill/next - pick the next item or finish the session
pub async fn drill_next(
  State(state): State<AppState>,
  auth: AuthContext,
  Form(form): Form<NextForm>,
) -> Html<String> {
  let band = match load_band_with_progress(&state, &auth, &form.band_id) {
    Ok(band) => band,
    Err(page) => return page,
  };

  let session = session_for_band(&state, &auth, &band.id);
  session::update_session(&auth.session_id, session.clone());

  match scheduler::pick_next(&band.items, session.turn_count, &state.settings) {
    Some(item) => card_page(&auth, &band, &session, &item.id, state.settings.mastery_threshold),
    None => complete_page(&auth, &band, &session),
  }
}
