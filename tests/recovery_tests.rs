// tests/recovery_tests.rs

use avtotest::routes::recovery_layer;
use axum::{Router, routing::get};
use tower::ServiceExt;

async fn boom() -> &'static str {
    panic!("handler exploded")
}

fn panicking_app() -> Router {
    Router::new()
        .route("/boom", get(boom))
        .route("/ok", get(|| async { "fine" }))
        .layer(recovery_layer())
}

#[tokio::test]
async fn panic_becomes_internal_error_page() {
    let response = panicking_app()
        .oneshot(
            axum::http::Request::builder()
                .uri("/boom")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("Internal Server Error"));
    assert!(!body.contains("handler exploded"));
}

#[tokio::test]
async fn server_keeps_serving_after_a_panic() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, panicking_app()).await.unwrap();
    });
    let client = reqwest::Client::new();

    let boom = client.get(format!("{}/boom", address)).send().await.unwrap();
    assert_eq!(boom.status().as_u16(), 500);

    let ok = client.get(format!("{}/ok", address)).send().await.unwrap();
    assert_eq!(ok.status().as_u16(), 200);
    assert_eq!(ok.text().await.unwrap(), "fine");
}
