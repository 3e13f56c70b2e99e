// src/handlers/questions.rs

use std::collections::HashSet;

use axum::extract::{Extension, Path, Query, State};
use maud::Markup;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db,
    error::AppError,
    utils::session::{CurrentUser, Session},
    views::{
        Nav, PageContext,
        questions::{
            BookmarksView, QuestionDetailView, QuestionListView, SearchView, bookmarks_page,
            question_detail_page, question_list_page, search_page,
        },
    },
};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Every question, ordered by number, with the viewer's bookmark flags.
pub async fn list(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Result<Markup, AppError> {
    let questions = db::questions::list_all(&pool).await?;
    let bookmarked = db::bookmarks::question_ids(&pool, user.id).await?;

    let ctx = PageContext {
        user: &user,
        csrf_token: &session.csrf_token,
        nav: Nav::Questions,
    };
    Ok(question_list_page(
        &ctx,
        &QuestionListView {
            questions: &questions,
            bookmarked: &bookmarked,
        },
    ))
}

pub async fn detail(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> Result<Markup, AppError> {
    let question = db::questions::find(&pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Savol topilmadi".to_string()))?;
    let is_bookmarked = db::bookmarks::is_bookmarked(&pool, user.id, id).await?;

    let ctx = PageContext {
        user: &user,
        csrf_token: &session.csrf_token,
        nav: Nav::Questions,
    };
    Ok(question_detail_page(
        &ctx,
        &QuestionDetailView {
            question: &question,
            is_bookmarked,
        },
    ))
}

/// Case-insensitive substring search. A blank query shows no results.
pub async fn search(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Query(params): Query<SearchParams>,
) -> Result<Markup, AppError> {
    let query = params.q.trim();

    let (questions, bookmarked) = if query.is_empty() {
        (Vec::new(), HashSet::new())
    } else {
        (
            db::questions::search(&pool, query).await?,
            db::bookmarks::question_ids(&pool, user.id).await?,
        )
    };

    let ctx = PageContext {
        user: &user,
        csrf_token: &session.csrf_token,
        nav: Nav::Search,
    };
    Ok(search_page(
        &ctx,
        &SearchView {
            query,
            questions: &questions,
            bookmarked: &bookmarked,
        },
    ))
}

pub async fn bookmarks(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
) -> Result<Markup, AppError> {
    let questions = db::bookmarks::list_questions(&pool, user.id).await?;

    let ctx = PageContext {
        user: &user,
        csrf_token: &session.csrf_token,
        nav: Nav::Bookmarks,
    };
    Ok(bookmarks_page(&ctx, &BookmarksView { questions: &questions }))
}
