// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    docs::ApiDoc,
    handlers::{quiz, result},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Multipart framing allowance on top of the file ceiling.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Assembles the main application router.
///
/// * Quiz and result routes, all behind the token check.
/// * Stored source PDFs under `/files`, API docs under `/swagger-ui`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = [
        state.config.public_base_url.as_str(),
        "http://localhost:3000",
        "http://127.0.0.1:3000",
    ]
    .iter()
    .filter_map(|origin| origin.trim_end_matches('/').parse().ok())
    .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let body_limit = state.config.upload.max_file_size() as usize + MULTIPART_OVERHEAD;

    let quiz_routes = Router::new()
        .route(
            "/",
            get(quiz::list_quizzes)
                .post(quiz::create_quiz)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/{id}", get(quiz::get_quiz).delete(quiz::delete_quiz))
        .route("/{id}/title", put(quiz::rename_quiz))
        .route("/{id}/pin", put(quiz::toggle_pin))
        .route("/{id}/clone", post(quiz::clone_quiz))
        .route("/{id}/results", post(result::submit_result));

    let result_routes = Router::new()
        .route("/", get(result::list_history))
        .route("/{id}", get(result::get_result));

    let api_routes = Router::new()
        .nest("/quizzes", quiz_routes)
        .nest("/results", result_routes)
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/files", ServeDir::new(&state.config.storage_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
