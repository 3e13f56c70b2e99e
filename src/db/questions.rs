// src/db/questions.rs

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json};

use crate::{
    error::is_unique_violation,
    models::question::{Question, QuestionDraft, QuestionRow},
};

pub(crate) const QUESTION_COLUMNS: &str = "id, number, text, image, variants_json, correct_answer, \
     variant_a, variant_b, variant_c, variant_d, created_at, updated_at";

/// Whole bank ordered by display number.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Question>, sqlx::Error> {
    let rows = sqlx::query_as::<_, QuestionRow>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions ORDER BY number"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Question::from).collect())
}

pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Question>, sqlx::Error> {
    let row = sqlx::query_as::<_, QuestionRow>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Question::from))
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

/// Every question id; the population the sampler draws from.
pub async fn all_ids(pool: &SqlitePool) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM questions")
        .fetch_all(pool)
        .await
}

/// Loads the given questions keyed by id. Unknown ids are simply absent.
pub async fn find_many<'c, E>(executor: E, ids: &[i64]) -> Result<HashMap<i64, Question>, sqlx::Error>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    // Use QueryBuilder for dynamic IN clause
    let mut query_builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE id IN ("
    ));
    let mut separated = query_builder.separated(",");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let rows: Vec<QuestionRow> = query_builder.build_query_as().fetch_all(executor).await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.id, Question::from(row)))
        .collect())
}

/// Case-insensitive substring search over text, variant texts and number.
///
/// Matching runs on the resolved questions so variant JSON syntax is never
/// searched and non-ASCII text folds the same way on both sides.
pub async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<Question>, sqlx::Error> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(Vec::new());
    }

    let questions = list_all(pool).await?;
    Ok(questions
        .into_iter()
        .filter(|question| question.matches_search(&needle))
        .collect())
}

/// Two inserts racing for the same next number: the loser retries once.
const CREATE_ATTEMPTS: usize = 2;

/// Inserts a question numbered one past the current maximum.
/// Returns the new id.
pub async fn create(
    pool: &SqlitePool,
    draft: &QuestionDraft,
    image: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let mut attempt = 1;
    loop {
        match insert_next_number(pool, draft, image).await {
            Err(e) if attempt < CREATE_ATTEMPTS && is_unique_violation(&e) => {
                tracing::warn!("Question number taken concurrently, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

async fn insert_next_number(
    pool: &SqlitePool,
    draft: &QuestionDraft,
    image: Option<&str>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO questions (number, text, image, variants_json, correct_answer)
        SELECT COALESCE(MAX(number), 0) + 1, ?, ?, ?, ? FROM questions
        RETURNING id
        "#,
    )
    .bind(&draft.text)
    .bind(image.unwrap_or_default())
    .bind(Json(&draft.variants))
    .bind(&draft.correct_answer)
    .fetch_one(pool)
    .await
}

/// Rewrites a question's content. The legacy A-D columns are cleared so the
/// ordered list stays the only source of variants.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    draft: &QuestionDraft,
    image: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE questions SET
            text = ?,
            image = ?,
            variants_json = ?,
            correct_answer = ?,
            variant_a = '', variant_b = '', variant_c = '', variant_d = '',
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&draft.text)
    .bind(image.unwrap_or_default())
    .bind(Json(&draft.variants))
    .bind(&draft.correct_answer)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
