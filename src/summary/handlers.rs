use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::engine::{self, CategoryTotal, DashboardSummary, WindowedTrend};
use crate::{
    auth::{extractors::AuthSession, repo_types::UserSnapshot},
    error::AppError,
    expenses::repo_types::Expense,
    state::AppState,
    store::timed,
};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: UserSnapshot,
    #[serde(flatten)]
    pub summary: DashboardSummary,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub categories: Vec<CategoryTotal>,
}

pub fn summary_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/compare", get(compare))
        .route("/stats", get(stats))
}

async fn load_expenses(state: &AppState, user_id: Uuid) -> Result<Vec<Expense>, AppError> {
    let rows = timed(state.store_timeout(), state.expenses.list_by_user(user_id)).await?;
    debug!(%user_id, count = rows.len(), "expenses loaded for aggregation");
    Ok(rows)
}

#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<DashboardResponse>, AppError> {
    let expenses = load_expenses(&state, session.user_id()).await?;
    let summary = engine::summarize(&expenses, state.clock.today());
    Ok(Json(DashboardResponse {
        user: session.user,
        summary,
    }))
}

#[instrument(skip_all)]
pub async fn compare(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<WindowedTrend>, AppError> {
    let expenses = load_expenses(&state, session.user_id()).await?;
    Ok(Json(engine::windowed_trend(&expenses, state.clock.today())))
}

#[instrument(skip_all)]
pub async fn stats(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<StatsResponse>, AppError> {
    let expenses = load_expenses(&state, session.user_id()).await?;
    Ok(Json(StatsResponse {
        categories: engine::category_breakdown(&expenses),
    }))
}
