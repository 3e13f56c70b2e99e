// src/config.rs

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

/// Signing key older deployments fell back to when none was configured.
const LEGACY_DEFAULT_SECRET: &str = "default-secret-key-change-in-production";

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    /// Session cookie lifetime in seconds.
    pub session_ttl: u64,
    pub cookie_secure: bool,
    pub rust_log: String,
    pub port: u16,
    pub media_dir: PathBuf,
    pub static_dir: PathBuf,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let session_secret = env::var("SESSION_SECRET")
            .expect("SESSION_SECRET must be set");
        if let Err(reason) = check_session_secret(&session_secret) {
            panic!("SESSION_SECRET rejected: {}", reason);
        }

        let session_ttl = env::var("SESSION_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60 * 60 * 24 * 30);

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        let media_dir = env::var("MEDIA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("media"));

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static"));

        let admin_username = env::var("ADMIN_USERNAME").ok().filter(|v| !v.is_empty());
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());

        Self {
            database_url,
            session_secret,
            session_ttl,
            cookie_secure,
            rust_log,
            port,
            media_dir,
            static_dir,
            admin_username,
            admin_password,
        }
    }
}

/// Validates the cookie signing key. A rejected key is a startup error.
pub fn check_session_secret(secret: &str) -> Result<(), String> {
    if secret.trim().is_empty() {
        return Err("secret is empty".to_string());
    }
    if secret == LEGACY_DEFAULT_SECRET {
        return Err("secret equals the old insecure default".to_string());
    }
    if secret.len() < MIN_SECRET_LEN {
        return Err(format!("secret must be at least {} bytes", MIN_SECRET_LEN));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_weak_secrets() {
        assert!(check_session_secret("").is_err());
        assert!(check_session_secret("   ").is_err());
        assert!(check_session_secret("short").is_err());
        assert!(check_session_secret(LEGACY_DEFAULT_SECRET).is_err());
    }

    #[test]
    fn accepts_long_random_secret() {
        assert!(check_session_secret("f3a9c1d27b5e48a09c6d1e2f3a4b5c6d7e8f9a0b").is_ok());
    }
}
