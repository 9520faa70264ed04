use sea_orm::DatabaseConnection;

use crate::config::admin::AdminCredentials;
use crate::services::round_orchestrator::RoundOrchestrator;

/// Application state containing shared resources
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection (None when the process runs unconfigured)
    db: Option<DatabaseConnection>,
    /// The one round orchestrator for this process
    orchestrator: RoundOrchestrator,
    /// Credentials guarding the moderator endpoints
    admin: AdminCredentials,
}

impl AppState {
    pub fn new(
        db: Option<DatabaseConnection>,
        orchestrator: RoundOrchestrator,
        admin: AdminCredentials,
    ) -> Self {
        Self {
            db,
            orchestrator,
            admin,
        }
    }

    /// Get a reference to the database connection if available
    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }

    pub fn orchestrator(&self) -> RoundOrchestrator {
        self.orchestrator.clone()
    }

    pub fn admin(&self) -> &AdminCredentials {
        &self.admin
    }
}
