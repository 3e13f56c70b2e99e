// src/models/user.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.@+-]+$").expect("valid username pattern"));

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    /// Staff users reach the admin panel.
    pub is_staff: bool,

    pub date_joined: chrono::DateTime<chrono::Utc>,
}

/// Login form. CSRF token travels alongside the credentials.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Admin form for creating or editing a regular user.
/// On edit an empty password keeps the current one.
#[derive(Debug, Deserialize, Validate)]
pub struct UserForm {
    #[validate(
        length(
            min = 3,
            max = 50,
            message = "Login uzunligi 3 dan 50 gacha belgi bo'lishi kerak."
        ),
        regex(path = *USERNAME_RE, message = "Login faqat harf, raqam va _.@+- belgilaridan iborat bo'lishi kerak.")
    )]
    pub username: String,
    #[validate(length(
        max = 128,
        message = "Parol 128 belgidan oshmasligi kerak."
    ))]
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Self-service profile form; blank fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(max = 50, message = "Login 50 belgidan oshmasligi kerak."))]
    #[serde(default)]
    pub new_username: String,
    #[validate(length(max = 128, message = "Parol 128 belgidan oshmasligi kerak."))]
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub csrf_token: String,
}

pub fn is_valid_username(username: &str) -> bool {
    (3..=50).contains(&username.chars().count()) && USERNAME_RE.is_match(username)
}
