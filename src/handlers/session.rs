// src/handlers/session.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::result::SubmissionResponse,
    repository::Store,
    session::{QuizSession, SessionError, SessionRegistry},
    utils::jwt::AuthUser,
};

#[derive(Debug, Deserialize)]
pub struct SelectAnswerRequest {
    pub option_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct GoToRequest {
    pub index: usize,
}

/// Starts a new attempt at a quiz.
///
/// Returns 201 with the first session view, or 404 when the quiz is missing
/// or has no questions (the client goes back to the listing).
pub async fn start_session(
    State(store): State<Store>,
    State(sessions): State<SessionRegistry>,
    user: AuthUser,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = QuizSession::load(store.quizzes.as_ref(), user.id, quiz_id)
        .await
        .map_err(|e| {
            if !matches!(e, SessionError::NotFound) {
                tracing::error!("Failed to load quiz {}: {:?}", quiz_id, e);
            }
            AppError::from(e)
        })?;

    let view = sessions.insert(session);
    tracing::debug!("User {} started session {} on quiz {}", user.id, view.session_id, quiz_id);

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    State(sessions): State<SessionRegistry>,
    user: AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = sessions.view(user.id, session_id).await?;
    Ok(Json(view))
}

/// Records the answer to the current question.
pub async fn select_answer(
    State(sessions): State<SessionRegistry>,
    user: AuthUser,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let view = sessions
        .update(user.id, session_id, |s| s.select_answer(req.option_index))
        .await?;
    Ok(Json(view))
}

pub async fn next_question(
    State(sessions): State<SessionRegistry>,
    user: AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = sessions
        .update(user.id, session_id, |s| {
            s.advance();
            Ok(())
        })
        .await?;
    Ok(Json(view))
}

pub async fn previous_question(
    State(sessions): State<SessionRegistry>,
    user: AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = sessions
        .update(user.id, session_id, |s| {
            s.retreat();
            Ok(())
        })
        .await?;
    Ok(Json(view))
}

pub async fn go_to_question(
    State(sessions): State<SessionRegistry>,
    user: AuthUser,
    Path(session_id): Path<Uuid>,
    Json(req): Json<GoToRequest>,
) -> Result<impl IntoResponse, AppError> {
    let view = sessions
        .update(user.id, session_id, |s| s.go_to(req.index))
        .await?;
    Ok(Json(view))
}

/// Grades the attempt and stores a new result.
///
/// * 400 if any question is unanswered (nothing is stored).
/// * 500 if the insert fails; the session stays open and can be resubmitted.
/// * 200 with the new result id otherwise; the session is closed.
pub async fn submit_session(
    State(store): State<Store>,
    State(sessions): State<SessionRegistry>,
    user: AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let submission = sessions
        .submit(user.id, session_id, store.results.clone())
        .await?;

    Ok(Json(SubmissionResponse {
        result_id: submission.result_id,
        score: submission.score.percentage,
        correct_count: submission.score.correct,
        total_questions: submission.score.total,
        passed: submission.score.passed,
    }))
}

/// Discards an unfinished attempt.
pub async fn abandon_session(
    State(sessions): State<SessionRegistry>,
    user: AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    sessions.abandon(user.id, session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
