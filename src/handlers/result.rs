// src/handlers/result.rs

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    certificate::Certificate,
    error::AppError,
    models::{
        quiz::Quiz,
        result::{QuizResult, ResultDetails},
    },
    repository::{StorageError, Store},
    utils::jwt::AuthUser,
};

/// Loads a result owned by the caller together with its quiz.
/// Someone else's result is reported as missing.
async fn owned_result(
    store: &Store,
    user: &AuthUser,
    result_id: Uuid,
) -> Result<(QuizResult, Quiz), AppError> {
    let result = match store.results.get_result(result_id).await {
        Ok(result) if result.user_id == user.id => result,
        Ok(_) | Err(StorageError::NotFound) => {
            return Err(AppError::NotFound("Result not found".to_string()));
        }
        Err(e) => {
            tracing::error!("Failed to load result {}: {:?}", result_id, e);
            return Err(AppError::from(e));
        }
    };

    let quiz = store.quizzes.get_quiz(result.quiz_id).await?;
    Ok((result, quiz))
}

/// Returns one result with its quiz and the number of correct answers.
pub async fn get_result(
    State(store): State<Store>,
    user: AuthUser,
    Path(result_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (result, quiz) = owned_result(&store, &user, result_id).await?;

    Ok(Json(ResultDetails {
        correct_answers: result.correct_answers(),
        result,
        quiz,
    }))
}

async fn issue_certificate(
    store: &Store,
    user: &AuthUser,
    result_id: Uuid,
) -> Result<Certificate, AppError> {
    let (result, quiz) = owned_result(store, user, result_id).await?;
    let recipient = store.users.get_user(user.id).await?;
    Certificate::issue(&result, &quiz, &recipient.name)
        .ok_or_else(|| AppError::NotFound("Certificate not available".to_string()))
}

/// Certificate data for a passed result.
pub async fn get_certificate(
    State(store): State<Store>,
    user: AuthUser,
    Path(result_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let certificate = issue_certificate(&store, &user, result_id).await?;
    Ok(Json(certificate))
}

/// Printable certificate document, served as a download.
pub async fn download_certificate(
    State(store): State<Store>,
    user: AuthUser,
    Path(result_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let certificate = issue_certificate(&store, &user, result_id).await?;
    let disposition = format!("attachment; filename=\"{}\"", certificate.file_name());

    tracing::info!("User {} downloaded certificate {}", user.id, certificate.certificate_id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        certificate.render_html(),
    ))
}
