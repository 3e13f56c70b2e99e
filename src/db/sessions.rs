// src/db/sessions.rs

use std::collections::HashMap;

use sqlx::{SqlitePool, types::Json};

use crate::{
    db::questions,
    models::test_session::{AnswerReview, SessionWithUser, TestAnswer, TestSession},
    utils::grading,
};

const SESSION_COLUMNS: &str = "id, user_id, total_questions, correct_answers, wrong_answers, \
     time_spent, completed, question_ids, created_at";

/// Outcome of a submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// This call completed the session.
    Completed(TestSession),
    /// The session was already completed; nothing was written.
    AlreadyCompleted,
    /// No such session for this user.
    NotFound,
}

/// Persists a new in-progress session holding a snapshot of `question_ids`.
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    question_ids: &[i64],
) -> Result<TestSession, sqlx::Error> {
    sqlx::query_as::<_, TestSession>(&format!(
        "INSERT INTO test_sessions (user_id, total_questions, question_ids)
         VALUES (?, ?, ?)
         RETURNING {SESSION_COLUMNS}"
    ))
    .bind(user_id)
    .bind(question_ids.len() as i64)
    .bind(Json(question_ids))
    .fetch_one(pool)
    .await
}

/// A session, only if it belongs to `user_id`.
pub async fn find_for_user(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> Result<Option<TestSession>, sqlx::Error> {
    sqlx::query_as::<_, TestSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM test_sessions WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Completed sessions of a user, newest first.
pub async fn completed_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<TestSession>, sqlx::Error> {
    sqlx::query_as::<_, TestSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM test_sessions
         WHERE user_id = ? AND completed = TRUE
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn count_completed_for_user(pool: &SqlitePool, user_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM test_sessions WHERE user_id = ? AND completed = TRUE",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn count_completed(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM test_sessions WHERE completed = TRUE")
        .fetch_one(pool)
        .await
}

/// Most recent completed sessions across all users.
pub async fn recent_completed(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<SessionWithUser>, sqlx::Error> {
    sqlx::query_as::<_, SessionWithUser>(
        r#"
        SELECT
            ts.id, ts.user_id, ts.total_questions, ts.correct_answers, ts.wrong_answers,
            ts.time_spent, ts.completed, ts.question_ids, ts.created_at,
            u.username
        FROM test_sessions ts
        JOIN users u ON ts.user_id = u.id
        WHERE ts.completed = TRUE
        ORDER BY ts.created_at DESC, ts.id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Stored answers of a session in grading order, each with its question.
pub async fn answers_with_questions(
    pool: &SqlitePool,
    session_id: i64,
) -> Result<Vec<AnswerReview>, sqlx::Error> {
    let answers = sqlx::query_as::<_, TestAnswer>(
        r#"
        SELECT id, session_id, question_id, selected_answer, is_correct
        FROM test_answers
        WHERE session_id = ?
        ORDER BY id
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    let ids: Vec<i64> = answers.iter().map(|a| a.question_id).collect();
    let questions = questions::find_many(pool, &ids).await?;

    Ok(answers
        .into_iter()
        .filter_map(|answer| {
            let question = questions.get(&answer.question_id).cloned()?;
            Some(AnswerReview { answer, question })
        })
        .collect())
}

/// Completes an in-progress session: grades `submitted` against the current
/// answer keys, stores one answer row per assigned question and sets the
/// counters, elapsed time and completion flag.
///
/// Runs in one transaction. The final UPDATE is guarded by `completed = FALSE`,
/// so a concurrent or repeated submission writes nothing and reports
/// `AlreadyCompleted`.
pub async fn submit(
    pool: &SqlitePool,
    session_id: i64,
    user_id: i64,
    submitted: &HashMap<i64, String>,
    time_spent: i64,
) -> Result<SubmitOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let session = sqlx::query_as::<_, TestSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM test_sessions WHERE id = ? AND user_id = ?"
    ))
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(mut session) = session else {
        return Ok(SubmitOutcome::NotFound);
    };
    if session.completed {
        return Ok(SubmitOutcome::AlreadyCompleted);
    }

    let assigned = session.question_ids.0.clone();
    let answer_keys: HashMap<i64, String> = questions::find_many(&mut *tx, &assigned)
        .await?
        .into_iter()
        .map(|(id, question)| (id, question.correct_answer))
        .collect();

    let grade = grading::grade(&assigned, &answer_keys, submitted);
    let time_spent = time_spent.max(0);

    let claimed = sqlx::query(
        r#"
        UPDATE test_sessions
        SET correct_answers = ?, wrong_answers = ?, time_spent = ?, completed = TRUE
        WHERE id = ? AND completed = FALSE
        "#,
    )
    .bind(grade.correct)
    .bind(grade.wrong)
    .bind(time_spent)
    .bind(session.id)
    .execute(&mut *tx)
    .await?;

    if claimed.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(SubmitOutcome::AlreadyCompleted);
    }

    for answer in &grade.answers {
        sqlx::query(
            "INSERT INTO test_answers (session_id, question_id, selected_answer, is_correct)
             VALUES (?, ?, ?, ?)",
        )
        .bind(session.id)
        .bind(answer.question_id)
        .bind(&answer.selected)
        .bind(answer.is_correct)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        session_id = session.id,
        user_id,
        correct = grade.correct,
        wrong = grade.wrong,
        "Test session completed"
    );

    session.correct_answers = grade.correct;
    session.wrong_answers = grade.wrong;
    session.time_spent = time_spent;
    session.completed = true;

    Ok(SubmitOutcome::Completed(session))
}
