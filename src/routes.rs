// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, quiz, result, session},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Auth routes are public; everything else requires a bearer token.
/// * Admin routes additionally require the 'admin' role.
/// * Applies global middleware (Trace, CORS) and injects `AppState`.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:5173"),
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let admin_routes = Router::new()
        .route("/api/admin/quizzes", post(admin::create_quiz))
        .layer(middleware::from_fn(admin_middleware));

    // Auth first, then (for admin routes) the role check
    let protected_routes = Router::new()
        .route("/api/quizzes", get(quiz::list_quizzes))
        .route("/api/quizzes/{id}/sessions", post(session::start_session))
        .route("/api/dashboard", get(quiz::dashboard))
        .route("/api/sample-data", post(quiz::load_sample_data))
        .route(
            "/api/sessions/{id}",
            get(session::get_session).delete(session::abandon_session),
        )
        .route("/api/sessions/{id}/answer", put(session::select_answer))
        .route("/api/sessions/{id}/next", post(session::next_question))
        .route("/api/sessions/{id}/previous", post(session::previous_question))
        .route("/api/sessions/{id}/position", put(session::go_to_question))
        .route("/api/sessions/{id}/submit", post(session::submit_session))
        .route("/api/results/{id}", get(result::get_result))
        .route("/api/results/{id}/certificate", get(result::get_certificate))
        .route(
            "/api/results/{id}/certificate/download",
            get(result::download_certificate),
        )
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .merge(protected_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
