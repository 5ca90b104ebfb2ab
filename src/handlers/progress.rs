//! Progress overview and the explicit reset action.

use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::content;
use crate::db::{self, LogOnError, SqliteProgressStore};
use crate::drill::{self, ProgressStore};
use crate::state::AppState;

pub struct BandProgressRow {
  pub band_id: String,
  pub title: String,
  pub mastered: usize,
  pub total: usize,
}

#[derive(Template)]
#[template(path = "progress.html")]
pub struct ProgressTemplate {
  pub display_name: String,
  pub points: i64,
  pub max_streak: i64,
  pub rows: Vec<BandProgressRow>,
}

/// GET /progress - per-band mastery summary plus XP
pub async fn progress(State(state): State<AppState>, auth: AuthContext) -> Html<String> {
  let store = SqliteProgressStore::new(state.pool.clone());
  let threshold = state.settings.mastery_threshold;

  let mut rows = Vec::new();
  for summary in content::list_bands(&state.bands_dir) {
    let mut band = match content::load_band(&state.bands_dir, &summary.filename) {
      Ok(band) => band,
      Err(e) => {
        tracing::warn!("Skipping band {} in progress view: {}", summary.id, e);
        continue;
      }
    };
    drill::merge_progress(&mut band.items, &store.load(&auth.user_id, &band.id));
    rows.push(BandProgressRow {
      band_id: band.id.clone(),
      title: band.title.clone(),
      mastered: band.items.iter().filter(|i| i.is_mastered(threshold)).count(),
      total: band.items.len(),
    });
  }

  let xp = db::try_lock(&state.pool)
    .log_warn("XP load: lock failed")
    .and_then(|conn| db::load_xp(&conn, &auth.user_id).log_warn_default("Failed to load XP"))
    .unwrap_or_default();

  let template = ProgressTemplate {
    display_name: auth.display_name.clone(),
    points: xp.points,
    max_streak: xp.max_streak,
    rows,
  };
  Html(template.render().unwrap_or_default())
}

#[derive(Deserialize)]
pub struct ResetForm {
  pub band_id: String,
}

/// POST /progress/reset - clear a band's snapshot for this user.
/// The one permitted mastery decrease.
pub async fn reset_progress(
  State(state): State<AppState>,
  auth: AuthContext,
  Form(form): Form<ResetForm>,
) -> impl IntoResponse {
  match db::try_lock(&state.pool) {
    Ok(conn) => {
      let removed = db::reset_progress(&conn, &auth.user_id, &form.band_id)
        .log_warn_default("Failed to reset progress");
      tracing::info!(
        "Reset {} progress rows for {} in {}",
        removed,
        auth.user_id,
        form.band_id
      );
    }
    Err(e) => {
      tracing::warn!("Progress reset: {}", e);
    }
  }
  Redirect::to("/progress")
}
