// src/utils/session.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{config::Config, db, error::AppError, models::user::User, state::AppState};

pub const SESSION_COOKIE: &str = "session";

/// Claims carried by the signed session cookie.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionClaims {
    /// Logged-in user, absent for anonymous visitors.
    pub uid: Option<i64>,
    /// CSRF token bound to this cookie session.
    pub csrf: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Per-request view of the cookie session, stored in request extensions.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Option<i64>,
    pub csrf_token: String,
}

impl Session {
    /// Fresh session with no user and a new CSRF token.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            csrf_token: generate_csrf_token(),
        }
    }

    /// Session for a user who just logged in. The CSRF token is rotated.
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            csrf_token: generate_csrf_token(),
        }
    }

    /// Fails with 403 unless `provided` matches this session's token.
    pub fn verify_csrf(&self, provided: &str) -> Result<(), AppError> {
        if !provided.is_empty() && constant_time_eq(provided.as_bytes(), self.csrf_token.as_bytes())
        {
            return Ok(());
        }
        tracing::warn!(user_id = ?self.user_id, "CSRF validation failed");
        Err(AppError::Forbidden("CSRF token invalid".to_string()))
    }
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.uid,
            csrf_token: claims.csrf,
        }
    }
}

/// The authenticated user, injected by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Generate a new CSRF token
pub fn generate_csrf_token() -> String {
    let random_bytes: [u8; 32] = rand::rng().random();
    general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Signs the session into a cookie value.
pub fn sign_session(
    session: &Session,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    // Calculate expiration: current time + expiration_seconds
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = SessionClaims {
        uid: session.user_id,
        csrf: session.csrf_token.clone(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a cookie value.
///
/// Tampered, expired or malformed tokens are all rejected.
pub fn verify_session(token: &str, secret: &str) -> Result<SessionClaims, AppError> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Forbidden("Invalid session".to_string()))?;

    Ok(token_data.claims)
}

/// Builds the `session` cookie for `session`.
pub fn session_cookie(session: &Session, config: &Config) -> Result<Cookie<'static>, AppError> {
    let value = sign_session(session, &config.session_secret, config.session_ttl)?;
    let max_age = i64::try_from(config.session_ttl).unwrap_or(i64::MAX);

    Ok(Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(time::Duration::seconds(max_age))
        .build())
}

/// Replaces the session cookie on `jar`.
pub fn start_session(
    jar: CookieJar,
    session: &Session,
    config: &Config,
) -> Result<CookieJar, AppError> {
    Ok(jar.add(session_cookie(session, config)?))
}

fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{}=", SESSION_COOKIE);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}

/// Axum Middleware: Cookie session.
///
/// Decodes the `session` cookie into a `Session` extension. Requests without a
/// valid cookie get a fresh anonymous session, which is written back unless
/// the handler already issued its own cookie (login/logout).
pub async fn session_middleware(
    State(config): State<Config>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| verify_session(cookie.value(), &config.session_secret).ok());

    let (session, fresh) = match existing {
        Some(claims) => (Session::from(claims), false),
        None => (Session::anonymous(), true),
    };

    req.extensions_mut().insert(session.clone());
    let mut response = next.run(req).await;

    if fresh && !sets_session_cookie(&response) {
        match session_cookie(&session, &config)
            .map(|cookie| HeaderValue::from_str(&cookie.to_string()))
        {
            Ok(Ok(value)) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Ok(Err(e)) => tracing::error!("Session cookie is not a valid header: {}", e),
            Err(e) => tracing::error!("Failed to issue session cookie: {}", e),
        }
    }

    response
}

/// Axum Middleware: Authentication.
///
/// Must be used inside `session_middleware`. Loads the session's user and
/// injects `CurrentUser`; anonymous or stale sessions are sent to the login page.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = req
        .extensions()
        .get::<Session>()
        .and_then(|session| session.user_id);

    let Some(user_id) = user_id else {
        return Ok(Redirect::to("/login/").into_response());
    };

    let Some(user) = db::users::find_by_id(&state.pool, user_id).await? else {
        return Ok(Redirect::to("/login/").into_response());
    };

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `auth_middleware`. Non-staff users are redirected to their dashboard.
pub async fn admin_middleware(req: Request, next: Next) -> Response {
    let is_staff = req
        .extensions()
        .get::<CurrentUser>()
        .map(|CurrentUser(user)| user.is_staff);

    match is_staff {
        Some(true) => next.run(req).await,
        Some(false) => {
            tracing::warn!(path = %req.uri().path(), "Non-staff user denied admin access");
            Redirect::to("/dashboard/").into_response()
        }
        None => Redirect::to("/login/").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-unit-test-secret-0123";

    #[test]
    fn round_trips_user_and_csrf() {
        let session = Session::for_user(42);
        let token = sign_session(&session, SECRET, 60).unwrap();
        let claims = verify_session(&token, SECRET).unwrap();

        assert_eq!(claims.uid, Some(42));
        assert_eq!(claims.csrf, session.csrf_token);
    }

    #[test]
    fn rejects_token_signed_with_other_key() {
        let token = sign_session(&Session::anonymous(), SECRET, 60).unwrap();
        assert!(verify_session(&token, "another-secret-another-secret-0123456").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(verify_session("not-a-token", SECRET).is_err());
    }

    #[test]
    fn csrf_tokens_are_unique_and_checked() {
        let session = Session::anonymous();
        let other = Session::anonymous();

        assert_ne!(session.csrf_token, other.csrf_token);
        assert!(general_purpose::URL_SAFE_NO_PAD.decode(&session.csrf_token).is_ok());
        assert!(session.verify_csrf(&session.csrf_token).is_ok());
        assert!(session.verify_csrf(&other.csrf_token).is_err());
        assert!(session.verify_csrf("").is_err());
    }
}
