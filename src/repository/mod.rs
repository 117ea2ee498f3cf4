// src/repository/mod.rs

//! Storage contracts for quizzes, results and users.
//!
//! Handlers and the quiz session only talk to these traits. `postgres` backs
//! them with the real database; `memory` keeps everything in process and is
//! what the test suites run against.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    question::Question,
    quiz::Quiz,
    result::{NewResult, QuizResult},
    user::{NewUser, User},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StorageError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StorageError::Conflict(db_err.message().to_string())
            }
            other => StorageError::Database(other.to_string()),
        }
    }
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// All quizzes, newest first.
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StorageError>;

    /// Fetch one quiz.
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_quiz(&self, id: Uuid) -> Result<Quiz, StorageError>;

    /// Questions of a quiz sorted by `order_index`. Empty if the quiz has none.
    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>, StorageError>;

    /// Insert a quiz and its questions atomically.
    ///
    /// Returns `false` without touching anything when a quiz with the same id
    /// already exists.
    async fn insert_quiz(&self, quiz: &Quiz, questions: &[Question]) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Append a result row and return it with its generated id.
    async fn insert_result(&self, result: &NewResult) -> Result<QuizResult, StorageError>;

    async fn get_result(&self, id: Uuid) -> Result<QuizResult, StorageError>;

    /// Results of one user, newest first.
    async fn list_results_for_user(&self, user_id: Uuid) -> Result<Vec<QuizResult>, StorageError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns `StorageError::Conflict` if the email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User, StorageError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    async fn get_user(&self, id: Uuid) -> Result<User, StorageError>;
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Store {
    pub quizzes: Arc<dyn QuizRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        let repo = PgRepository::new(pool);
        Self {
            quizzes: Arc::new(repo.clone()),
            results: Arc::new(repo.clone()),
            users: Arc::new(repo),
        }
    }

    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            quizzes: Arc::new(repo.clone()),
            results: Arc::new(repo.clone()),
            users: Arc::new(repo),
        }
    }
}
