// src/handlers/auth.rs

use axum::{
    Form,
    extract::{Extension, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use maud::Markup;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    db,
    error::AppError,
    models::user::{LoginForm, User},
    utils::{
        hash::verify_password,
        session::{Session, start_session},
    },
    views::auth::{LoginView, login_page as render_login},
};

const LOGIN_FAILED: &str = "Login yoki parol xato!";

/// Landing page for each role.
pub fn home_for(user: &User) -> &'static str {
    if user.is_staff {
        "/admin-panel/"
    } else {
        "/dashboard/"
    }
}

/// `/`: sends visitors to the login page or their role's home.
pub async fn index(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<Session>,
) -> Result<Redirect, AppError> {
    let user = match session.user_id {
        Some(id) => db::users::find_by_id(&pool, id).await?,
        None => None,
    };

    Ok(match user {
        Some(user) => Redirect::to(home_for(&user)),
        None => Redirect::to("/login/"),
    })
}

/// Shows the login form. Already logged-in users go straight home.
pub async fn login_page(
    State(pool): State<SqlitePool>,
    Extension(session): Extension<Session>,
) -> Result<Response, AppError> {
    if let Some(id) = session.user_id {
        if let Some(user) = db::users::find_by_id(&pool, id).await? {
            return Ok(Redirect::to(home_for(&user)).into_response());
        }
    }

    Ok(render_login(&LoginView {
        csrf_token: &session.csrf_token,
        username: "",
        error: None,
    })
    .into_response())
}

/// Authenticates a user.
///
/// On success the session is replaced by one bound to the user, with a
/// rotated CSRF token. Bad credentials re-render the form without saying
/// which field was wrong.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    session.verify_csrf(&form.csrf_token)?;

    let user = db::users::find_by_username(&pool, form.username.trim()).await?;

    let authenticated = match user {
        Some(user) if verify_password(&form.password, &user.password_hash)? => Some(user),
        _ => None,
    };

    let Some(user) = authenticated else {
        tracing::warn!(username = %form.username, "Failed login attempt");
        return Ok(failed_login(&session, &form.username).into_response());
    };

    tracing::info!(user_id = user.id, "User logged in");
    let jar = start_session(jar, &Session::for_user(user.id), &config)?;
    Ok((jar, Redirect::to(home_for(&user))).into_response())
}

fn failed_login(session: &Session, username: &str) -> Markup {
    render_login(&LoginView {
        csrf_token: &session.csrf_token,
        username,
        error: Some(LOGIN_FAILED),
    })
}

/// Drops the user from the session by issuing a fresh anonymous one.
pub async fn logout(
    State(config): State<Config>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(user_id) = session.user_id {
        tracing::info!(user_id, "User logged out");
    }
    let jar = start_session(jar, &Session::anonymous(), &config)?;
    Ok((jar, Redirect::to("/login/")))
}
