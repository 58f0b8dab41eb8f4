use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{AuthResponse, LoginRequest, RegisterRequest},
    extractors::{bearer_token, AuthSession},
    repo_types::UserSnapshot,
    services,
};
use crate::{error::AppError, extract::AppJson, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let identity = services::register(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: identity.token,
            user: identity.session.user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let identity = services::login(&state, payload).await?;
    Ok(Json(AuthResponse {
        token: identity.token,
        user: identity.session.user,
    }))
}

#[instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    services::logout(&state, bearer_token(&headers)).await;
    StatusCode::NO_CONTENT
}

/// Served from the session snapshot, no user lookup.
#[instrument(skip_all)]
pub async fn get_me(AuthSession(session): AuthSession) -> Json<UserSnapshot> {
    Json(session.user)
}
