// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{
    Form,
    extract::{Extension, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db::{self, sessions::SubmitOutcome},
    error::AppError,
    models::{test_session::SessionState, user::User},
    utils::{
        grading::answers_from_form,
        sampler::sample_question_ids,
        session::{CurrentUser, Session},
    },
    views::{
        Nav, PageContext,
        quiz::{
            StartTestView, TakeTestView, TestResultView, start_test_page, take_test_page,
            test_result_page,
        },
    },
};

const NO_QUESTIONS: &str = "Bazada savollar yo'q, test tuzib bo'lmaydi.";

#[derive(Debug, Deserialize)]
pub struct StartTestForm {
    /// Kept as text so a blank or garbled value falls back to one question.
    #[serde(default)]
    pub num_questions: String,
    #[serde(default)]
    pub csrf_token: String,
}

fn ctx<'a>(user: &'a User, session: &'a Session) -> PageContext<'a> {
    PageContext {
        user,
        csrf_token: &session.csrf_token,
        nav: Nav::StartTest,
    }
}

fn result_url(session_id: i64) -> String {
    format!("/test/{}/result/", session_id)
}

pub async fn start_page(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Result<Response, AppError> {
    let total_available = db::questions::count(&pool).await?;
    let error = (total_available == 0).then_some(NO_QUESTIONS);

    Ok(start_test_page(
        &ctx(&user, &session),
        &StartTestView {
            total_available,
            error,
        },
    )
    .into_response())
}

/// Samples a fresh question set and opens an in-progress session for it.
pub async fn start(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Form(form): Form<StartTestForm>,
) -> Result<Response, AppError> {
    session.verify_csrf(&form.csrf_token)?;

    let population = db::questions::all_ids(&pool).await?;
    let requested = form.num_questions.trim().parse::<i64>().unwrap_or(1);
    let picked = sample_question_ids(&population, requested, &mut rand::rng());

    if picked.is_empty() {
        return Ok(start_test_page(
            &ctx(&user, &session),
            &StartTestView {
                total_available: 0,
                error: Some(NO_QUESTIONS),
            },
        )
        .into_response());
    }

    let test = db::sessions::create(&pool, user.id, &picked).await?;
    tracing::info!(
        user_id = user.id,
        session_id = test.id,
        questions = picked.len(),
        "Test session started"
    );

    Ok(Redirect::to(&format!("/test/{}/", test.id)).into_response())
}

/// Shows an in-progress test in its snapshot order.
pub async fn take(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(test) = db::sessions::find_for_user(&pool, id, user.id).await? else {
        return Ok(Redirect::to("/test/start/").into_response());
    };
    if test.state() == SessionState::Completed {
        return Ok(Redirect::to(&result_url(test.id)).into_response());
    }

    let mut by_id = db::questions::find_many(&pool, &test.question_ids.0).await?;
    let questions: Vec<_> = test
        .question_ids
        .0
        .iter()
        .filter_map(|qid| by_id.remove(qid))
        .collect();

    Ok(take_test_page(
        &ctx(&user, &session),
        &TakeTestView {
            session: &test,
            questions: &questions,
        },
    )
    .into_response())
}

/// Grades and completes a session. Resubmitting a completed session only
/// redirects to its result.
pub async fn submit(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    session.verify_csrf(form.get("csrf_token").map(String::as_str).unwrap_or_default())?;

    let answers = answers_from_form(&form);
    let time_spent = form
        .get("time_spent")
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(0);

    match db::sessions::submit(&pool, id, user.id, &answers, time_spent).await? {
        SubmitOutcome::Completed(_) | SubmitOutcome::AlreadyCompleted => {
            Ok(Redirect::to(&result_url(id)).into_response())
        }
        SubmitOutcome::NotFound => Err(AppError::NotFound("Test topilmadi".to_string())),
    }
}

pub async fn result(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let test = db::sessions::find_for_user(&pool, id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test topilmadi".to_string()))?;
    let answers = db::sessions::answers_with_questions(&pool, test.id).await?;

    Ok(test_result_page(
        &ctx(&user, &session),
        &TestResultView {
            session: &test,
            answers: &answers,
        },
    )
    .into_response())
}
