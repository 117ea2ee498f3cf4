// src/handlers/quiz.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::result::{DashboardQuiz, DashboardResponse, DashboardStats},
    repository::Store,
    seed,
    utils::jwt::AuthUser,
};

/// Lists all quizzes, newest first.
pub async fn list_quizzes(
    State(store): State<Store>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = store.quizzes.list_quizzes().await.map_err(|e| {
        tracing::error!("Failed to list quizzes: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(quizzes))
}

/// Quiz listing joined with the caller's history.
///
/// * Each quiz carries the caller's most recent result, if any.
/// * Stats cover every attempt: completed, passed, rounded average score.
pub async fn dashboard(
    State(store): State<Store>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = store.quizzes.list_quizzes().await?;
    let results = store.results.list_results_for_user(user.id).await?;

    // `results` is newest first, so the first match is the latest attempt.
    let quizzes = quizzes
        .into_iter()
        .map(|quiz| {
            let latest_result = results.iter().find(|r| r.quiz_id == quiz.id).cloned();
            DashboardQuiz {
                quiz,
                latest_result,
            }
        })
        .collect();

    Ok(Json(DashboardResponse {
        stats: DashboardStats::from_results(&results),
        quizzes,
        results,
    }))
}

/// Loads the demo quizzes. Safe to call repeatedly.
pub async fn load_sample_data(
    State(store): State<Store>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let inserted = seed::load_sample_data(store.quizzes.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to load sample data: {:?}", e);
            AppError::from(e)
        })?;

    tracing::info!("User {} loaded sample data ({} new quizzes)", user.id, inserted);
    Ok(Json(serde_json::json!({
        "inserted": inserted,
        "message": "Sample quizzes loaded successfully"
    })))
}
