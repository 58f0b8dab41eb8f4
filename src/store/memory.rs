use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ExpenseStore, SessionStore, StoreError, UserStore};
use crate::auth::repo_types::{NewUser, Session, User};
use crate::expenses::repo_types::{Expense, NewExpense};

/// Process-local store with the same uniqueness and ownership rules as the
/// Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    // insertion order is kept so list ordering ties resolve like `created_at DESC`
    expenses: RwLock<Vec<Expense>>,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, new: &NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            salary: new.salary,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Expense>, StoreError> {
        let expenses = self.expenses.read().await;
        let mut rows: Vec<Expense> = expenses
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Expense>, StoreError> {
        let expenses = self.expenses.read().await;
        Ok(expenses
            .iter()
            .find(|e| e.id == id && e.user_id == user_id)
            .cloned())
    }

    async fn insert(&self, user_id: Uuid, new: &NewExpense) -> Result<Expense, StoreError> {
        // mirrors the foreign key on expenses.user_id
        if !self.users.read().await.iter().any(|u| u.id == user_id) {
            return Err(StoreError::Unavailable(anyhow::anyhow!(
                "expense owner {user_id} does not exist"
            )));
        }
        let expense = Expense {
            id: Uuid::new_v4(),
            user_id,
            title: new.title.clone(),
            amount: new.amount,
            category: new.category.clone(),
            date: new.date,
            created_at: OffsetDateTime::now_utc(),
        };
        self.expenses.write().await.push(expense.clone());
        Ok(expense)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &NewExpense,
    ) -> Result<Option<Expense>, StoreError> {
        let mut expenses = self.expenses.write().await;
        let Some(row) = expenses
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
        else {
            return Ok(None);
        };
        row.title = fields.title.clone();
        row.amount = fields.amount;
        row.category = fields.category.clone();
        row.date = fields.date;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut expenses = self.expenses.write().await;
        let before = expenses.len();
        expenses.retain(|e| !(e.id == id && e.user_id == user_id));
        Ok(expenses.len() != before)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn put_session(&self, session: &Session) -> Result<(), StoreError> {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, StoreError> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .sessions
            .read()
            .await
            .get(&id)
            .filter(|s| !s.is_expired(now))
            .cloned())
    }

    async fn remove_session(&self, id: Uuid) -> Result<(), StoreError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}
