// src/handlers/admin.rs

use std::collections::HashMap;

use axum::{
    Form,
    extract::{Extension, Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::Markup;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    db,
    error::{AppError, is_unique_violation},
    handlers::{bookmarks::CsrfForm, profile::USERNAME_TAKEN},
    models::{
        question::{Question, QuestionDraft, VARIANT_LETTERS, Variant},
        test_session::average_score,
        user::{User, UserForm},
    },
    utils::{
        grading::normalize_letter,
        hash::hash_password,
        html::clean_html,
        session::{CurrentUser, Session},
        upload::{remove_question_image, save_question_image},
    },
    views::{
        Nav, PageContext,
        admin::{
            AdminDashboardView, AdminQuestionsView, AdminStatisticsView, AdminUsersView,
            QuestionFormValues, QuestionFormView, UserFormView, UserStat, dashboard_page,
            question_form_page, questions_page, statistics_page, user_form_page, users_page,
        },
    },
};

const RECENT_TESTS: i64 = 5;
const PASSWORD_REQUIRED: &str = "Parol kiritilishi shart.";
const USER_SAVED: &str = "Foydalanuvchi ma'lumotlari saqlandi!";
const NUMBER_TAKEN: &str = "Savolni saqlab bo'lmadi, qaytadan urinib ko'ring.";

fn ctx<'a>(user: &'a User, session: &'a Session, nav: Nav) -> PageContext<'a> {
    PageContext {
        user,
        csrf_token: &session.csrf_token,
        nav,
    }
}

fn user_not_found() -> AppError {
    AppError::NotFound("Foydalanuvchi topilmadi".to_string())
}

fn question_not_found() -> AppError {
    AppError::NotFound("Savol topilmadi".to_string())
}

pub async fn dashboard(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Result<Markup, AppError> {
    let total_questions = db::questions::count(&pool).await?;
    let total_users = db::users::count_regular(&pool).await?;
    let total_tests = db::sessions::count_completed(&pool).await?;
    let recent_tests = db::sessions::recent_completed(&pool, RECENT_TESTS).await?;

    Ok(dashboard_page(
        &ctx(&user, &session, Nav::AdminDashboard),
        &AdminDashboardView {
            total_questions,
            total_users,
            total_tests,
            recent_tests: &recent_tests,
        },
    ))
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Raw multipart submission of the question form.
#[derive(Debug, Default)]
struct QuestionSubmission {
    fields: HashMap<String, String>,
    /// Original file name and bytes of a non-empty upload.
    image: Option<(String, Vec<u8>)>,
}

impl QuestionSubmission {
    fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    /// Form values to echo back when the submission is rejected.
    fn values(&self, image: Option<String>) -> QuestionFormValues {
        QuestionFormValues {
            text: self.field("text").to_string(),
            variants: VARIANT_LETTERS
                .iter()
                .map(|letter| self.field(&variant_field(*letter)).to_string())
                .collect(),
            correct_answer: self.field("correct_answer").to_string(),
            image,
        }
    }
}

fn variant_field(letter: char) -> String {
    format!("variant_{}", letter.to_ascii_lowercase())
}

async fn read_submission(mut multipart: Multipart) -> Result<QuestionSubmission, AppError> {
    let mut submission = QuestionSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                submission.image = Some((file_name, bytes.to_vec()));
            }
        } else {
            let value = field.text().await?;
            submission.fields.insert(name, value);
        }
    }

    Ok(submission)
}

/// Turns raw form fields into a draft.
///
/// Variants are taken in letter order A..J with blank ones skipped. The
/// correct letter is uppercased and must name one of them.
fn build_draft(fields: &HashMap<String, String>) -> Result<QuestionDraft, &'static str> {
    let get = |name: &str| fields.get(name).map(|v| v.trim()).unwrap_or_default();

    let text = clean_html(get("text"));
    if text.trim().is_empty() {
        return Err("Savol matni bo'sh bo'lmasligi kerak.");
    }

    let variants: Vec<Variant> = VARIANT_LETTERS
        .iter()
        .filter_map(|letter| {
            let value = get(&variant_field(*letter));
            (!value.is_empty()).then(|| Variant::new(letter.to_string(), value))
        })
        .collect();
    if variants.is_empty() {
        return Err("Kamida bitta javob varianti kiritilishi kerak.");
    }

    let correct_answer = normalize_letter(get("correct_answer"));
    if !variants.iter().any(|v| v.letter == correct_answer) {
        return Err("To'g'ri javob mavjud variantlardan biri bo'lishi kerak.");
    }

    Ok(QuestionDraft {
        text,
        variants,
        correct_answer,
    })
}

pub async fn list_questions(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Result<Markup, AppError> {
    let questions = db::questions::list_all(&pool).await?;
    Ok(questions_page(
        &ctx(&user, &session, Nav::AdminQuestions),
        &AdminQuestionsView {
            questions: &questions,
        },
    ))
}

fn render_question_form(
    user: &User,
    session: &Session,
    question: Option<&Question>,
    values: &QuestionFormValues,
    error: Option<&str>,
) -> Markup {
    question_form_page(
        &ctx(user, session, Nav::AdminQuestions),
        &QuestionFormView {
            question,
            values,
            error,
        },
    )
}

pub async fn add_question_page(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Markup {
    render_question_form(&user, &session, None, &QuestionFormValues::default(), None)
}

/// Creates a question numbered one past the current maximum.
pub async fn add_question(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = read_submission(multipart).await?;
    session.verify_csrf(submission.field("csrf_token"))?;

    let draft = match build_draft(&submission.fields) {
        Ok(draft) => draft,
        Err(message) => {
            let values = submission.values(None);
            return Ok(
                render_question_form(&user, &session, None, &values, Some(message)).into_response(),
            );
        }
    };

    let image = match &submission.image {
        Some((name, bytes)) => Some(save_question_image(&config.media_dir, name, bytes).await?),
        None => None,
    };

    let id = match db::questions::create(&pool, &draft, image.as_deref()).await {
        Ok(id) => id,
        Err(e) => {
            if let Some(saved) = &image {
                remove_question_image(&config.media_dir, saved).await;
            }
            if !is_unique_violation(&e) {
                return Err(e.into());
            }
            let values = submission.values(None);
            return Ok(
                render_question_form(&user, &session, None, &values, Some(NUMBER_TAKEN))
                    .into_response(),
            );
        }
    };
    tracing::info!(question_id = id, admin_id = user.id, "Question created");

    Ok(Redirect::to("/admin-panel/questions/").into_response())
}

pub async fn edit_question_page(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<Markup, AppError> {
    let question = db::questions::find(&pool, id)
        .await?
        .ok_or_else(question_not_found)?;
    let values = QuestionFormValues::from_question(&question);
    Ok(render_question_form(&user, &session, Some(&question), &values, None))
}

/// Rewrites a question. A new upload replaces the stored image;
/// `remove_image` drops it.
pub async fn edit_question(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = read_submission(multipart).await?;
    session.verify_csrf(submission.field("csrf_token"))?;

    let question = db::questions::find(&pool, id)
        .await?
        .ok_or_else(question_not_found)?;

    let draft = match build_draft(&submission.fields) {
        Ok(draft) => draft,
        Err(message) => {
            let values = submission.values(question.image.clone());
            return Ok(render_question_form(
                &user,
                &session,
                Some(&question),
                &values,
                Some(message),
            )
            .into_response());
        }
    };

    let uploaded = match &submission.image {
        Some((name, bytes)) => Some(save_question_image(&config.media_dir, name, bytes).await?),
        None => None,
    };
    let image = match uploaded.clone() {
        Some(path) => Some(path),
        None if submission.fields.contains_key("remove_image") => None,
        None => question.image.clone(),
    };

    let updated = db::questions::update(&pool, id, &draft, image.as_deref()).await;
    if !matches!(updated, Ok(true)) {
        if let Some(saved) = &uploaded {
            remove_question_image(&config.media_dir, saved).await;
        }
        updated?;
        return Err(question_not_found());
    }

    if let Some(old) = &question.image {
        if image.as_ref() != Some(old) {
            remove_question_image(&config.media_dir, old).await;
        }
    }
    tracing::info!(question_id = id, admin_id = user.id, "Question updated");

    Ok(Redirect::to("/admin-panel/questions/").into_response())
}

pub async fn delete_question(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf_token)?;

    let question = db::questions::find(&pool, id)
        .await?
        .ok_or_else(question_not_found)?;
    if !db::questions::delete(&pool, id).await? {
        return Err(question_not_found());
    }
    if let Some(image) = &question.image {
        remove_question_image(&config.media_dir, image).await;
    }
    tracing::info!(question_id = id, admin_id = user.id, "Question deleted");

    Ok(Redirect::to("/admin-panel/questions/"))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub async fn list_users(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Result<Markup, AppError> {
    let users = db::users::list_regular(&pool).await?;
    Ok(users_page(
        &ctx(&user, &session, Nav::AdminUsers),
        &AdminUsersView { users: &users },
    ))
}

fn render_user_form(
    admin: &User,
    session: &Session,
    edit_user: Option<&User>,
    username: &str,
    error: Option<&str>,
    success: Option<&str>,
) -> Markup {
    user_form_page(
        &ctx(admin, session, Nav::AdminUsers),
        &UserFormView {
            edit_user,
            username,
            error,
            success,
        },
    )
}

pub async fn add_user_page(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Markup {
    render_user_form(&user, &session, None, "", None, None)
}

/// Creates a regular (non-staff) account.
pub async fn add_user(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Form(mut form): Form<UserForm>,
) -> Result<Response, AppError> {
    session.verify_csrf(&form.csrf_token)?;
    form.username = form.username.trim().to_string();

    let rejection = if let Err(errors) = form.validate() {
        Some(errors.to_string())
    } else if form.password.is_empty() {
        Some(PASSWORD_REQUIRED.to_string())
    } else if db::users::username_taken(&pool, &form.username, None).await? {
        Some(USERNAME_TAKEN.to_string())
    } else {
        None
    };
    if let Some(message) = rejection {
        return Ok(
            render_user_form(&admin, &session, None, &form.username, Some(&message), None)
                .into_response(),
        );
    }

    let hash = hash_password(&form.password)?;
    let id = match db::users::create(&pool, &form.username, &hash, false).await {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => {
            return Ok(render_user_form(
                &admin,
                &session,
                None,
                &form.username,
                Some(USERNAME_TAKEN),
                None,
            )
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = id, admin_id = admin.id, "User created");

    Ok(Redirect::to("/admin-panel/users/").into_response())
}

/// A non-staff user; staff accounts are not editable here.
async fn find_regular(pool: &SqlitePool, id: i64) -> Result<User, AppError> {
    db::users::find_by_id(pool, id)
        .await?
        .filter(|user| !user.is_staff)
        .ok_or_else(user_not_found)
}

pub async fn edit_user_page(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<Markup, AppError> {
    let target = find_regular(&pool, id).await?;
    Ok(render_user_form(
        &admin,
        &session,
        Some(&target),
        &target.username,
        None,
        None,
    ))
}

/// Renames a user and, when a password is given, resets it.
pub async fn edit_user(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    Form(mut form): Form<UserForm>,
) -> Result<Markup, AppError> {
    session.verify_csrf(&form.csrf_token)?;
    let mut target = find_regular(&pool, id).await?;
    form.username = form.username.trim().to_string();

    let rejection = if let Err(errors) = form.validate() {
        Some(errors.to_string())
    } else if db::users::username_taken(&pool, &form.username, Some(id)).await? {
        Some(USERNAME_TAKEN.to_string())
    } else {
        None
    };
    if let Some(message) = rejection {
        return Ok(render_user_form(
            &admin,
            &session,
            Some(&target),
            &form.username,
            Some(&message),
            None,
        ));
    }

    if form.username != target.username {
        match db::users::update_username(&pool, id, &form.username).await {
            Ok(()) => target.username = form.username.clone(),
            Err(e) if is_unique_violation(&e) => {
                return Ok(render_user_form(
                    &admin,
                    &session,
                    Some(&target),
                    &form.username,
                    Some(USERNAME_TAKEN),
                    None,
                ));
            }
            Err(e) => return Err(e.into()),
        }
    }
    if !form.password.is_empty() {
        let hash = hash_password(&form.password)?;
        db::users::update_password(&pool, id, &hash).await?;
    }
    tracing::info!(user_id = id, admin_id = admin.id, "User updated");

    Ok(render_user_form(
        &admin,
        &session,
        Some(&target),
        &target.username,
        None,
        Some(USER_SAVED),
    ))
}

/// Deletes a non-staff user together with their sessions and bookmarks.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf_token)?;

    if !db::users::delete_regular(&pool, id).await? {
        return Err(user_not_found());
    }
    tracing::info!(user_id = id, admin_id = admin.id, "User deleted");

    Ok(Redirect::to("/admin-panel/users/"))
}

/// Completed test count and average score per regular user.
pub async fn statistics(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Result<Markup, AppError> {
    let users = db::users::list_regular(&pool).await?;

    let mut user_stats = Vec::with_capacity(users.len());
    for regular in &users {
        let completed = db::sessions::completed_for_user(&pool, regular.id).await?;
        user_stats.push(UserStat {
            user: regular,
            total_tests: completed.len(),
            avg_score: average_score(&completed),
        });
    }

    Ok(statistics_page(
        &ctx(&user, &session, Nav::AdminStatistics),
        &AdminStatisticsView {
            user_stats: &user_stats,
        },
    ))
}
