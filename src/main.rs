use axum::{routing::get, routing::post, Router};
use std::path::PathBuf;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use milim::services::TranslationClient;
use milim::state::AppState;
use milim::{auth, config, content, db, handlers, paths};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "milim=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_path = config::load_database_path();
  let pool = db::init_db(&db_path).expect("Failed to initialize database");

  let bands_dir = PathBuf::from(paths::bands_dir());
  if let Err(e) = content::seed_starter_band(&bands_dir) {
    tracing::warn!("Failed to seed starter band: {}", e);
  }

  let translator = TranslationClient::new(config::translate_endpoint());
  let state = AppState::new(pool, bands_dir, translator, config::DrillSettings::default());

  let app = Router::new()
    .route("/", get(handlers::index))
    .route("/login", get(auth::login_page).post(auth::login))
    .route("/logout", post(auth::logout))
    .route("/drill", get(handlers::drill_start))
    .route("/drill/answer", post(handlers::drill_answer))
    .route("/drill/next", post(handlers::drill_next))
    .route("/progress", get(handlers::progress))
    .route("/progress/reset", post(handlers::reset_progress))
    .nest_service("/static", ServeDir::new("static"))
    .layer(TraceLayer::new_for_http())
    .with_state(state);

  let bind_addr = config::server_bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config::SERVER_PORT);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
