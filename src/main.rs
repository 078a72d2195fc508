mod app;
mod auth;
mod config;
mod entitlements;
mod favourites;
mod places;
mod restaurants;
mod retry;
mod session;
mod state;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "moodbite=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    // Run migrations if present
    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    // Until this runs the slot reads as loading; without an API key it is
    // disabled and premium checks answer "free tier" at once.
    entitlements::services::configure_slot(&app_state.entitlements, &app_state.config.entitlements);

    let app = app::build_app(app_state);
    app::serve(app).await
}
