// src/db/users.rs

use sqlx::SqlitePool;

use crate::models::user::User;

const USER_COLUMNS: &str = "id, username, password_hash, is_staff, date_joined";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// Whether `username` belongs to anyone other than `exclude_id`.
pub async fn username_taken(
    pool: &SqlitePool,
    username: &str,
    exclude_id: Option<i64>,
) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ? AND id != ?")
            .bind(username)
            .bind(exclude_id.unwrap_or(0))
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    is_staff: bool,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, password_hash, is_staff) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(username)
    .bind(password_hash)
    .bind(is_staff)
    .fetch_one(pool)
    .await
}

pub async fn update_username(
    pool: &SqlitePool,
    id: i64,
    username: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET username = ? WHERE id = ?")
        .bind(username)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_password(
    pool: &SqlitePool,
    id: i64,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Non-staff users, oldest first.
pub async fn list_regular(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE is_staff = FALSE ORDER BY id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn count_regular(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_staff = FALSE")
        .fetch_one(pool)
        .await
}

/// Deletes a non-staff user; staff accounts are never removed here.
/// Sessions, answers and bookmarks go with the user via ON DELETE CASCADE.
pub async fn delete_regular(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ? AND is_staff = FALSE")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
