// src/handlers/bookmarks.rs

use axum::{
    Form, Json,
    extract::{Extension, Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use url::Url;

use crate::{
    db,
    error::AppError,
    models::bookmark::ToggleResponse,
    utils::session::{CurrentUser, Session},
};

#[derive(Debug, Deserialize)]
pub struct CsrfForm {
    #[serde(default)]
    pub csrf_token: String,
}

fn is_xhr(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// Path and query of `referer` when it points at `host`; anything else
/// (other origins, unparsable values) yields `None`.
fn same_origin_path(referer: &str, host: &str) -> Option<String> {
    let url = Url::parse(referer).ok()?;
    let authority = match url.port() {
        Some(port) => format!("{}:{}", url.host_str()?, port),
        None => url.host_str()?.to_string(),
    };
    if !authority.eq_ignore_ascii_case(host) {
        return None;
    }
    Some(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}

/// Flips the viewer's bookmark on a question.
///
/// XHR callers get `{"status": "added" | "removed"}`; plain form posts are
/// redirected back to the referring page.
pub async fn toggle(
    State(pool): State<SqlitePool>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(session): Extension<Session>,
    Path(question_id): Path<i64>,
    headers: HeaderMap,
    Form(form): Form<CsrfForm>,
) -> Result<Response, AppError> {
    session.verify_csrf(&form.csrf_token)?;

    if db::questions::find(&pool, question_id).await?.is_none() {
        return Err(AppError::NotFound("Savol topilmadi".to_string()));
    }

    let status = db::bookmarks::toggle(&pool, user.id, question_id).await?;
    tracing::debug!(user_id = user.id, question_id, status = status.as_str(), "Bookmark toggled");

    if is_xhr(&headers) {
        return Ok(Json(ToggleResponse { status }).into_response());
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let target = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|referer| same_origin_path(referer, host))
        .unwrap_or_else(|| "/questions/".to_string());

    Ok(Redirect::to(&target).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_same_origin_referer() {
        assert_eq!(
            same_origin_path("http://localhost:5000/search/?q=yo", "localhost:5000").as_deref(),
            Some("/search/?q=yo")
        );
        assert_eq!(
            same_origin_path("https://avtotest.uz/questions/3/", "avtotest.uz").as_deref(),
            Some("/questions/3/")
        );
    }

    #[test]
    fn drops_foreign_or_broken_referer() {
        assert_eq!(same_origin_path("https://evil.example/", "localhost:5000"), None);
        assert_eq!(same_origin_path("http://localhost:6000/", "localhost:5000"), None);
        assert_eq!(same_origin_path("/relative", "localhost:5000"), None);
    }
}
