pub mod drill;
pub mod progress;

use askama::Template;
use axum::{extract::State, response::Html};

use crate::auth::OptionalAuth;
use crate::content::{self, BandSummary};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
  pub display_name: Option<String>,
  pub bands: Vec<BandSummary>,
}

pub async fn index(State(state): State<AppState>, OptionalAuth(auth): OptionalAuth) -> Html<String> {
  let template = IndexTemplate {
    display_name: auth.map(|a| a.display_name),
    bands: content::list_bands(&state.bands_dir),
  };
  Html(template.render().unwrap_or_default())
}

pub use drill::{drill_answer, drill_next, drill_start};
pub use progress::{progress, reset_progress};
