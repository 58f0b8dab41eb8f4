use crate::clock::{Clock, FixedClock, SystemClock};
use crate::config::AppConfig;
use crate::store::{ExpenseStore, MemoryStore, PgStore, SessionStore, UserStore};
use std::sync::Arc;
use std::time::Duration;
use time::Date;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub expenses: Arc<dyn ExpenseStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgStore)> {
        let store = PgStore::connect(&config).await?;
        let shared = Arc::new(store.clone());
        let state = Self {
            config: Arc::new(config),
            users: shared.clone(),
            expenses: shared.clone(),
            sessions: shared,
            clock: Arc::new(SystemClock),
        };
        Ok((state, store))
    }

    pub fn store_timeout(&self) -> Duration {
        self.config.store_timeout()
    }

    /// In-memory state for tests and local experiments.
    pub fn fake() -> Self {
        Self::with_memory(Arc::new(SystemClock))
    }

    /// Same as [`AppState::fake`] with "today" pinned.
    pub fn fake_at(today: Date) -> Self {
        Self::with_memory(Arc::new(FixedClock(today)))
    }

    fn with_memory(clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            config: Arc::new(AppConfig::for_tests()),
            users: store.clone(),
            expenses: store.clone(),
            sessions: store,
            clock,
        }
    }
}
