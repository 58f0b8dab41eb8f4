use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{ExpenseStore, SessionStore, StoreError, UserStore};
use crate::auth::repo_types::{NewUser, Session, User, UserSnapshot};
use crate::config::AppConfig;
use crate::expenses::repo_types::{Expense, NewExpense};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.store_timeout())
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, salary, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, salary, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, new: &NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, salary)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, salary, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.salary)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl ExpenseStore for PgStore {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, user_id, title, amount, category, date, created_at
            FROM expenses
            WHERE user_id = $1
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Expense>, StoreError> {
        let row = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, user_id, title, amount, category, date, created_at
            FROM expenses
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert(&self, user_id: Uuid, new: &NewExpense) -> Result<Expense, StoreError> {
        let row = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (user_id, title, amount, category, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, amount, category, date, created_at
            "#,
        )
        .bind(user_id)
        .bind(&new.title)
        .bind(new.amount)
        .bind(&new.category)
        .bind(new.date)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &NewExpense,
    ) -> Result<Option<Expense>, StoreError> {
        let row = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
               SET title = $3, amount = $4, category = $5, date = $6
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, amount, category, date, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&fields.title)
        .bind(fields.amount)
        .bind(&fields.category)
        .bind(fields.date)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    email: String,
    salary: f64,
    created_at: OffsetDateTime,
    expires_at: OffsetDateTime,
}

impl From<SessionRow> for Session {
    fn from(r: SessionRow) -> Self {
        Self {
            id: r.id,
            user: UserSnapshot {
                id: r.user_id,
                name: r.name,
                email: r.email,
                salary: r.salary,
            },
            created_at: r.created_at,
            expires_at: r.expires_at,
        }
    }
}

#[async_trait]
impl SessionStore for PgStore {
    /// Opening a session also sweeps out every expired one.
    async fn put_session(&self, session: &Session) -> Result<(), StoreError> {
        let purged = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.db)
            .await?
            .rows_affected();
        if purged > 0 {
            debug!(purged, "expired sessions removed");
        }

        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, name, email, salary, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.id)
        .bind(session.user.id)
        .bind(&session.user.name)
        .bind(&session.user.email)
        .bind(session.user.salary)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, name, email, salary, created_at, expires_at
            FROM sessions
            WHERE id = $1 AND expires_at > now()
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Session::from))
    }

    async fn remove_session(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
