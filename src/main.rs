mod app;
mod auth;
mod clock;
mod config;
mod error;
mod extract;
mod expenses;
mod state;
mod store;
mod summary;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "spendwise=debug,axum=info,tower_http=info".to_string());
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

    let config = AppConfig::from_env()?;
    auth::password::init_dummy_hash()?;
    let (app_state, store) = AppState::init(config).await?;

    sqlx::migrate!("./migrations")
        .run(store.pool())
        .await
        .map_err(|e| anyhow::anyhow!("database migration failed: {e}"))?;
    tracing::info!("migrations applied");

    app::serve(app::build_app(app_state)).await
}
