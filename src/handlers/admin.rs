// src/handlers/admin.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use sqlx::types::Json as SqlJson;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::Question,
        quiz::{CreateQuizRequest, Quiz},
    },
    repository::Store,
    utils::jwt::AuthUser,
};

/// Creates a quiz together with its questions.
/// Admin only. Questions are ordered as submitted.
pub async fn create_quiz(
    State(store): State<Store>,
    admin: AuthUser,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let quiz = Quiz {
        id: Uuid::new_v4(),
        title: payload.title.trim().to_string(),
        description: payload.description,
        passing_score: payload.passing_score,
        created_at: Utc::now(),
    };

    let questions: Vec<Question> = payload
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| Question {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            question_text: q.question_text,
            options: SqlJson(q.options),
            correct_answer: q.correct_answer,
            order_index: i as i32 + 1,
        })
        .collect();

    store
        .quizzes
        .insert_quiz(&quiz, &questions)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz: {:?}", e);
            AppError::from(e)
        })?;

    tracing::info!(
        "Admin {} created quiz {} with {} questions",
        admin.id,
        quiz.id,
        questions.len()
    );
    Ok((StatusCode::CREATED, Json(quiz)))
}
