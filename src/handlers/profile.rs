// src/handlers/profile.rs

use axum::{
    Form,
    extract::{Extension, State},
};
use maud::Markup;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    db,
    error::{AppError, is_unique_violation},
    models::{
        test_session::average_score,
        user::{ProfileForm, User, is_valid_username},
    },
    utils::{
        hash::hash_password,
        session::{CurrentUser, Session},
    },
    views::{
        Nav, PageContext,
        stats::{self, DashboardView, ProfileView, StatisticsView, dashboard_page, statistics_page},
    },
};

pub const USERNAME_TAKEN: &str = "Bu login allaqachon mavjud!";
const INVALID_USERNAME: &str = "Login 3-50 belgidan iborat bo'lib, faqat harf, raqam va _.@+- belgilarini o'z ichiga olishi kerak.";
const PROFILE_SAVED: &str = "Profil muvaffaqiyatli yangilandi!";
const RECENT_SESSIONS: usize = 10;

pub async fn dashboard(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Result<Markup, AppError> {
    let total_questions = db::questions::count(&pool).await?;
    let bookmark_count = db::bookmarks::count(&pool, user.id).await?;
    let completed = db::sessions::completed_for_user(&pool, user.id).await?;

    let ctx = PageContext {
        user: &user,
        csrf_token: &session.csrf_token,
        nav: Nav::Dashboard,
    };
    Ok(dashboard_page(
        &ctx,
        &DashboardView {
            total_questions,
            bookmark_count,
            test_count: completed.len() as i64,
            avg_score: average_score(&completed),
        },
    ))
}

/// Aggregates over the viewer's completed tests.
pub async fn statistics(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Result<Markup, AppError> {
    let completed = db::sessions::completed_for_user(&pool, user.id).await?;

    let best_score = completed.iter().map(|s| s.score_percent()).max().unwrap_or(0);
    let total_correct = completed.iter().map(|s| s.correct_answers).sum();
    let recent = &completed[..completed.len().min(RECENT_SESSIONS)];

    let ctx = PageContext {
        user: &user,
        csrf_token: &session.csrf_token,
        nav: Nav::Statistics,
    };
    Ok(statistics_page(
        &ctx,
        &StatisticsView {
            total_tests: completed.len(),
            avg_score: average_score(&completed),
            best_score,
            total_correct,
            recent_sessions: recent,
        },
    ))
}

pub async fn profile_page(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Markup {
    render(&user, &session, None, None)
}

/// Changes the viewer's username and/or password. Blank fields are ignored.
pub async fn update_profile(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Form(form): Form<ProfileForm>,
) -> Result<Markup, AppError> {
    session.verify_csrf(&form.csrf_token)?;

    if let Err(errors) = form.validate() {
        return Ok(render(&user, &session, Some(&errors.to_string()), None));
    }

    let new_username = form.new_username.trim();
    if !new_username.is_empty() && new_username != user.username {
        if !is_valid_username(new_username) {
            return Ok(render(&user, &session, Some(INVALID_USERNAME), None));
        }
        if db::users::username_taken(&pool, new_username, Some(user.id)).await? {
            return Ok(render(&user, &session, Some(USERNAME_TAKEN), None));
        }
        match db::users::update_username(&pool, user.id, new_username).await {
            Ok(()) => user.username = new_username.to_string(),
            Err(e) if is_unique_violation(&e) => {
                return Ok(render(&user, &session, Some(USERNAME_TAKEN), None));
            }
            Err(e) => return Err(e.into()),
        }
    }

    let new_password = form.new_password.trim();
    if !new_password.is_empty() {
        let hash = hash_password(new_password)?;
        db::users::update_password(&pool, user.id, &hash).await?;
    }

    tracing::info!(user_id = user.id, "Profile updated");
    Ok(render(&user, &session, None, Some(PROFILE_SAVED)))
}

fn render(user: &User, session: &Session, error: Option<&str>, success: Option<&str>) -> Markup {
    let ctx = PageContext {
        user,
        csrf_token: &session.csrf_token,
        nav: Nav::Profile,
    };
    stats::profile_page(&ctx, &ProfileView { error, success })
}
