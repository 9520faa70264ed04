//! Database fixtures on top of a migrated in-memory SQLite database.

use quiz_backend::config::db::{DbKind, RuntimeEnv};
use quiz_backend::entities::{choices, correct_answers, questions};
use quiz_backend::infra::state::build_state;
use quiz_backend::repos::users::User;
use quiz_backend::services::signup::sign_up;
use quiz_backend::state::app_state::AppState;
use std::path::PathBuf;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};

pub async fn sqlite_state() -> AppState {
    build_state()
        .with_env(RuntimeEnv::Test)
        .with_db(DbKind::SqliteMemory)
        .build()
        .await
        .expect("build sqlite state")
}

/// A migrated SQLite file database behind a pool of several connections,
/// so concurrent transactions really run on separate connections.
pub struct SqliteFile {
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl SqliteFile {
    pub async fn create() -> Self {
        let path = std::env::temp_dir().join(format!("quiz-{}.db", uuid::Uuid::new_v4()));
        let mut opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
        opts.max_connections(4).sqlx_logging(false);
        let db = Database::connect(opts).await.expect("open sqlite file");
        migrate(&db, MigrationCommand::Up).await.expect("migrate sqlite file");
        Self { db, path }
    }
}

impl Drop for SqliteFile {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub fn db(state: &AppState) -> &DatabaseConnection {
    state.db().expect("state has a database")
}

pub async fn insert_question(db: &DatabaseConnection, id: i64, content: &str) {
    questions::Entity::insert(questions::ActiveModel {
        id: Set(id),
        content: Set(content.to_string()),
    })
    .exec(db)
    .await
    .expect("insert question");
}

pub async fn insert_choice(db: &DatabaseConnection, id: i64, content: &str) {
    choices::Entity::insert(choices::ActiveModel {
        id: Set(id),
        content: Set(content.to_string()),
    })
    .exec(db)
    .await
    .expect("insert choice");
}

pub async fn mark_correct(db: &DatabaseConnection, question_id: i64, choice_id: i64) {
    correct_answers::Entity::insert(correct_answers::ActiveModel {
        question_id: Set(question_id),
        choice_id: Set(choice_id),
    })
    .exec_without_returning(db)
    .await
    .expect("insert correct answer");
}

/// Questions 1..=3 ("Q1".."Q3") and choices 1..=8 ("C1".."C8"); choice 7 is
/// correct for question 3.
pub async fn seed_quiz(db: &DatabaseConnection) {
    for id in 1..=3 {
        insert_question(db, id, &format!("Q{id}")).await;
    }
    for id in 1..=8 {
        insert_choice(db, id, &format!("C{id}")).await;
    }
    mark_correct(db, 3, 7).await;
}

pub async fn participant(db: &DatabaseConnection, name: &str) -> User {
    sign_up(db, name).await.expect("sign up")
}
