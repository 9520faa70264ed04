use std::sync::Arc;

use crate::config::admin::AdminCredentials;
use crate::config::db::{DbKind, RuntimeEnv};
use crate::config::round::RoundTimings;
use crate::error::AppError;
use crate::infra::db::connect_and_migrate;
use crate::services::quiz_store::{QuizStore, SeaQuizStore};
use crate::services::round_orchestrator::RoundOrchestrator;
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    env: RuntimeEnv,
    db_kind: Option<DbKind>,
    admin: AdminCredentials,
    timings: RoundTimings,
    store: Option<Arc<dyn QuizStore>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            env: RuntimeEnv::Prod,
            db_kind: None,
            admin: AdminCredentials::default(),
            timings: RoundTimings::default(),
            store: None,
        }
    }

    pub fn with_env(mut self, env: RuntimeEnv) -> Self {
        self.env = env;
        self
    }

    pub fn with_db(mut self, kind: DbKind) -> Self {
        self.db_kind = Some(kind);
        self
    }

    pub fn with_admin(mut self, admin: AdminCredentials) -> Self {
        self.admin = admin;
        self
    }

    pub fn with_timings(mut self, timings: RoundTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Drive the orchestrator from this store instead of the database.
    pub fn with_store(mut self, store: Arc<dyn QuizStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let db = match self.db_kind {
            // single entrypoint: connect + migrate
            Some(kind) => Some(connect_and_migrate(self.env, kind).await?),
            None => None,
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(SeaQuizStore::new(db.clone())));
        let orchestrator = RoundOrchestrator::new(store, self.timings);
        Ok(AppState::new(db, orchestrator, self.admin))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
