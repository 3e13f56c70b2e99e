// src/routes.rs

use std::any::Any;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, bookmarks, profile, questions, quiz},
    state::AppState,
    utils::session::{admin_middleware, auth_middleware, session_middleware},
    views,
};

/// Uploads (question images) are capped at 10 MiB per request.
const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Assembles the main application router.
///
/// * Public routes: index, login, logout.
/// * User routes behind `auth_middleware`.
/// * Admin routes behind `auth_middleware` then `admin_middleware`.
/// * Every request passes through the cookie session layer; panics in
///   handlers become a 500 page.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(auth::index))
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/logout/", get(auth::logout));

    let user_routes = Router::new()
        .route("/dashboard/", get(profile::dashboard))
        .route("/questions/", get(questions::list))
        .route("/questions/{id}/", get(questions::detail))
        .route("/search/", get(questions::search))
        .route("/bookmark/toggle/{id}/", post(bookmarks::toggle))
        .route("/bookmarks/", get(questions::bookmarks))
        .route("/test/start/", get(quiz::start_page).post(quiz::start))
        .route("/test/{id}/", get(quiz::take))
        .route("/test/{id}/submit/", post(quiz::submit))
        .route("/test/{id}/result/", get(quiz::result))
        .route("/statistics/", get(profile::statistics))
        .route(
            "/profile/",
            get(profile::profile_page).post(profile::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/admin-panel/", get(admin::dashboard))
        .route("/admin-panel/questions/", get(admin::list_questions))
        .route(
            "/admin-panel/questions/add/",
            get(admin::add_question_page).post(admin::add_question),
        )
        .route(
            "/admin-panel/questions/{id}/edit/",
            get(admin::edit_question_page).post(admin::edit_question),
        )
        .route(
            "/admin-panel/questions/{id}/delete/",
            post(admin::delete_question),
        )
        .route("/admin-panel/users/", get(admin::list_users))
        .route(
            "/admin-panel/users/add/",
            get(admin::add_user_page).post(admin::add_user),
        )
        .route(
            "/admin-panel/users/{id}/edit/",
            get(admin::edit_user_page).post(admin::edit_user),
        )
        .route("/admin-panel/users/{id}/delete/", post(admin::delete_user))
        .route("/admin-panel/statistics/", get(admin::statistics))
        // Double middleware protection: Auth first, then Admin check
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .nest_service("/media", ServeDir::new(&state.config.media_dir))
        // Global Middleware (listed from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(recovery_layer())
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(
                    state.config.clone(),
                    session_middleware,
                ))
                .layer(DefaultBodyLimit::max(BODY_LIMIT)),
        )
        .with_state(state)
}

/// Outermost layer: a panicking handler yields a logged 500 page instead of
/// a dropped connection.
pub fn recovery_layer() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(handle_panic as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!("Request handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        views::error_page(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
    )
        .into_response()
}
