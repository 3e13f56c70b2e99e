// tests/common/mod.rs
//
// Shared harness: every test gets its own in-memory database, media
// directory and server on a random port.

#![allow(dead_code)]

use avtotest::{
    config::Config,
    db,
    models::question::{QuestionDraft, Variant},
    routes,
    state::AppState,
    utils::hash::hash_password,
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tempfile::TempDir;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
    pub media_dir: TempDir,
}

/// Spawns the app on a random port for testing.
pub async fn spawn_app() -> TestApp {
    // A single connection that never expires keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let media_dir = tempfile::tempdir().expect("Failed to create media dir");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        session_secret: "integration-test-secret-0123456789abcdef".to_string(),
        session_ttl: 600,
        cookie_secure: false,
        rust_log: "error".to_string(),
        port: 0,
        media_dir: media_dir.path().to_path_buf(),
        static_dir: "static".into(),
        admin_username: None,
        admin_password: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        client: new_client(),
        media_dir,
    }
}

/// Cookie-keeping client that reports redirects instead of following them.
pub fn new_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// The `csrf_token` hidden field of a rendered page.
pub fn extract_csrf(html: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker).expect("page has no csrf field") + marker.len();
    let end = html[start..].find('"').unwrap();
    html[start..start + end].to_string()
}

pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
        .to_string()
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// CSRF token of the current cookie session, read from `path`.
    pub async fn csrf_from(&self, path: &str) -> String {
        let body = self.get(path).await.text().await.unwrap();
        extract_csrf(&body)
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        let token = self.csrf_from("/login/").await;
        self.post_form(
            "/login/",
            &[
                ("username", username),
                ("password", password),
                ("csrf_token", &token),
            ],
        )
        .await
    }

    pub async fn create_user(&self, username: &str, is_staff: bool) -> i64 {
        let hash = hash_password(PASSWORD).unwrap();
        db::users::create(&self.pool, username, &hash, is_staff)
            .await
            .unwrap()
    }

    /// Creates a user and logs the client in as them.
    pub async fn logged_in_as(&self, username: &str, is_staff: bool) -> i64 {
        let id = self.create_user(username, is_staff).await;
        let response = self.login(username, PASSWORD).await;
        assert_eq!(response.status().as_u16(), 303, "login should redirect");
        id
    }

    /// Question with variants A-D where `correct` is the right letter.
    pub async fn create_question(&self, text: &str, correct: &str) -> i64 {
        let draft = QuestionDraft {
            text: text.to_string(),
            variants: ["A", "B", "C", "D"]
                .iter()
                .map(|letter| Variant::new(*letter, format!("{} variant {}", text, letter)))
                .collect(),
            correct_answer: correct.to_string(),
        };
        db::questions::create(&self.pool, &draft, None).await.unwrap()
    }
}
