use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{ExpenseForm, ExpenseListResponse},
    repo_types::Expense,
    services,
};
use crate::{
    auth::extractors::AuthSession,
    error::AppError,
    extract::{AppJson, AppPath},
    state::AppState,
};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

#[instrument(skip_all)]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<ExpenseListResponse>, AppError> {
    Ok(Json(services::list_expenses(&state, &session).await?))
}

#[instrument(skip_all)]
pub async fn create_expense(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    AppJson(form): AppJson<ExpenseForm>,
) -> Result<impl IntoResponse, AppError> {
    let expense = services::add_expense(&state, &session, form).await?;
    let location = format!("/api/v1/expenses/{}", expense.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(expense),
    ))
}

#[instrument(skip(state, session))]
pub async fn get_expense(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Expense>, AppError> {
    Ok(Json(services::get_expense(&state, &session, id).await?))
}

#[instrument(skip(state, session, form))]
pub async fn update_expense(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    AppPath(id): AppPath<Uuid>,
    AppJson(form): AppJson<ExpenseForm>,
) -> Result<Json<Expense>, AppError> {
    Ok(Json(services::edit_expense(&state, &session, id, form).await?))
}

#[instrument(skip(state, session))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_expense(&state, &session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
