use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{LoginRequest, RegisterRequest},
    jwt::SessionKeys,
    password::{hash_password, verify_dummy, verify_password},
    repo_types::{NewUser, Session, User, UserSnapshot},
};
use crate::{
    error::AppError,
    state::AppState,
    store::{timed, StoreError},
};

/// Signed token handed to the client plus the session it names.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub token: String,
    pub session: Session,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[instrument(skip(st, req), fields(email = %normalize_email(&req.email)))]
pub async fn register(st: &AppState, req: RegisterRequest) -> Result<SessionIdentity, AppError> {
    let email = normalize_email(&req.email);
    let name = req.name.trim().to_string();

    if name.is_empty() {
        return Err(AppError::invalid("Name is required"));
    }
    if !is_valid_email(&email) {
        warn!("invalid email");
        return Err(AppError::invalid("Invalid email"));
    }
    if req.password.len() < 8 {
        warn!("password too short");
        return Err(AppError::invalid("Password too short"));
    }
    if !req.salary.is_finite() || req.salary < 0.0 {
        return Err(AppError::invalid("Salary must be a non-negative number"));
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AppError::StoreUnavailable
    })?;

    let new = NewUser {
        name,
        email,
        password_hash,
        salary: req.salary,
    };
    // uniqueness is left to the store so concurrent registrations race safely
    let user = match timed(st.store_timeout(), st.users.create_user(&new)).await {
        Ok(u) => u,
        Err(StoreError::Duplicate) => {
            warn!("email already registered");
            return Err(AppError::DuplicateEmail);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, "user registered");
    open_session(st, &user).await
}

#[instrument(skip(st, req), fields(email = %normalize_email(&req.email)))]
pub async fn login(st: &AppState, req: LoginRequest) -> Result<SessionIdentity, AppError> {
    let email = normalize_email(&req.email);

    let found = if is_valid_email(&email) {
        timed(st.store_timeout(), st.users.find_user_by_email(&email)).await?
    } else {
        None
    };

    let Some(user) = found else {
        verify_dummy(&req.password);
        warn!("login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let ok = verify_password(&req.password, &user.password_hash).unwrap_or_else(|e| {
        error!(error = %e, user_id = %user.id, "stored password hash unreadable");
        false
    });
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    open_session(st, &user).await
}

async fn open_session(st: &AppState, user: &User) -> Result<SessionIdentity, AppError> {
    let keys = SessionKeys::from_ref(st);
    let now = OffsetDateTime::now_utc();
    let session = Session {
        id: Uuid::new_v4(),
        user: UserSnapshot::from(user),
        created_at: now,
        expires_at: now + keys.ttl(),
    };
    timed(st.store_timeout(), st.sessions.put_session(&session)).await?;

    let token = keys.sign(user.id, session.id).map_err(|e| {
        error!(error = %e, "session token signing failed");
        AppError::StoreUnavailable
    })?;
    Ok(SessionIdentity { token, session })
}

/// Destroys the session named by `token`. Never fails.
#[instrument(skip_all)]
pub async fn logout(st: &AppState, token: Option<&str>) {
    let Some(claims) = token.and_then(|t| SessionKeys::from_ref(st).verify(t).ok()) else {
        return;
    };
    match timed(st.store_timeout(), st.sessions.remove_session(claims.sid)).await {
        Ok(()) => info!(user_id = %claims.sub, session_id = %claims.sid, "session closed"),
        Err(e) => error!(error = %e, session_id = %claims.sid, "remove_session failed"),
    }
}

/// Gate for every protected operation; anything short of a live session is `Unauthorized`.
pub async fn require_session(st: &AppState, token: Option<&str>) -> Result<Session, AppError> {
    let token = token.ok_or(AppError::Unauthorized)?;
    let claims = SessionKeys::from_ref(st).verify(token).map_err(|_| {
        warn!("invalid or expired session token");
        AppError::Unauthorized
    })?;

    let session = timed(st.store_timeout(), st.sessions.get_session(claims.sid))
        .await?
        .ok_or_else(|| {
            warn!(session_id = %claims.sid, "session not found or expired");
            AppError::Unauthorized
        })?;

    if session.user_id() != claims.sub {
        warn!(session_id = %claims.sid, "session bound to another user");
        return Err(AppError::Unauthorized);
    }
    Ok(session)
}
