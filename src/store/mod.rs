//! Persistence seams for users, expenses and sessions.
//!
//! Handlers and services only see these traits; `postgres` is the production
//! backend and `memory` backs `AppState::fake()` and the unit tests.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, Session, User};
use crate::expenses::repo_types::{Expense, NewExpense};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Duplicate,
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Unavailable(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Unavailable(e.into()),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn create_user(&self, new: &NewUser) -> Result<User, StoreError>;
}

/// Every query is scoped by the owning user id.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Newest date first; ties newest insert first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Expense>, StoreError>;
    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Expense>, StoreError>;
    async fn insert(&self, user_id: Uuid, new: &NewExpense) -> Result<Expense, StoreError>;
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &NewExpense,
    ) -> Result<Option<Expense>, StoreError>;
    /// Returns whether a row was removed.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put_session(&self, session: &Session) -> Result<(), StoreError>;
    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, StoreError>;
    /// Removing an unknown id is not an error.
    async fn remove_session(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Bounds a store call so a stalled backend surfaces as an error.
pub async fn timed<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}
