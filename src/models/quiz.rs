// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::question::{CreateQuestionRequest, validate_questions};

/// Represents the 'quizzes' table in the database.
/// Quizzes are immutable once created.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: String,

    /// Minimum score (0..=100) required to pass.
    pub passing_score: i32,

    pub created_at: DateTime<Utc>,
}

/// DTO for an admin creating a quiz together with its questions.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: i32,
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<CreateQuestionRequest>,
}
