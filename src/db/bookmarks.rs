// src/db/bookmarks.rs

use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::{
    db::questions::QUESTION_COLUMNS,
    models::{
        bookmark::BookmarkToggle,
        question::{Question, QuestionRow},
    },
};

/// Flips the (user, question) bookmark.
///
/// Two single statements, no explicit lock: the UNIQUE(user_id, question_id)
/// constraint plus `INSERT OR IGNORE` keep a racing double-click from creating
/// a duplicate row.
pub async fn toggle(
    pool: &SqlitePool,
    user_id: i64,
    question_id: i64,
) -> Result<BookmarkToggle, sqlx::Error> {
    let removed = sqlx::query("DELETE FROM bookmarks WHERE user_id = ? AND question_id = ?")
        .bind(user_id)
        .bind(question_id)
        .execute(pool)
        .await?;

    if removed.rows_affected() > 0 {
        return Ok(BookmarkToggle::Removed);
    }

    sqlx::query("INSERT OR IGNORE INTO bookmarks (user_id, question_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(question_id)
        .execute(pool)
        .await?;

    Ok(BookmarkToggle::Added)
}

pub async fn question_ids(pool: &SqlitePool, user_id: i64) -> Result<HashSet<i64>, sqlx::Error> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT question_id FROM bookmarks WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(ids.into_iter().collect())
}

pub async fn is_bookmarked(
    pool: &SqlitePool,
    user_id: i64,
    question_id: i64,
) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM bookmarks WHERE user_id = ? AND question_id = ?",
    )
    .bind(user_id)
    .bind(question_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// The user's bookmarked questions ordered by display number.
pub async fn list_questions(pool: &SqlitePool, user_id: i64) -> Result<Vec<Question>, sqlx::Error> {
    let rows = sqlx::query_as::<_, QuestionRow>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions
         WHERE id IN (SELECT question_id FROM bookmarks WHERE user_id = ?)
         ORDER BY number"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Question::from).collect())
}

pub async fn count(pool: &SqlitePool, user_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookmarks WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
}
