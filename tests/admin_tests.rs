// tests/admin_tests.rs

mod common;

use avtotest::db;
use common::{TestApp, location, spawn_app};
use reqwest::multipart::{Form, Part};

fn question_form(token: &str, text: &str, variants: &[&str], correct: &str) -> Form {
    let mut form = Form::new()
        .text("csrf_token", token.to_string())
        .text("text", text.to_string())
        .text("correct_answer", correct.to_string());
    for (letter, variant) in ["a", "b", "c", "d", "e"].iter().zip(variants) {
        form = form.text(format!("variant_{}", letter), variant.to_string());
    }
    form
}

async fn post_multipart(app: &TestApp, path: &str, form: Form) -> reqwest::Response {
    app.client
        .post(app.url(path))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn admin_creates_question_with_image() {
    let app = spawn_app().await;
    app.logged_in_as("boss", true).await;
    app.create_question("Mavjud savol", "A").await;
    let token = app.csrf_from("/admin-panel/questions/add/").await;

    let image = Part::bytes(b"\x89PNG fake".to_vec())
        .file_name("belgi.png")
        .mime_str("image/png")
        .unwrap();
    let form = question_form(
        &token,
        "<p>Bu belgi nimani <b>bildiradi</b>?</p><script>alert(1)</script>",
        &["To'xtash", "Yo'l bering", "Kirish taqiqlangan"],
        "b",
    )
    .part("image", image);

    let response = post_multipart(&app, "/admin-panel/questions/add/", form).await;
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(location(&response), "/admin-panel/questions/");

    let questions = db::questions::list_all(&app.pool).await.unwrap();
    assert_eq!(questions.len(), 2);
    let created = &questions[1];
    assert_eq!(created.number, 2);
    assert_eq!(created.correct_answer, "B");
    assert_eq!(created.variants.len(), 3);
    assert_eq!(created.correct_text(), Some("Yo'l bering"));
    assert!(created.text.contains("<b>bildiradi</b>"));
    assert!(!created.text.contains("script"));

    let image = created.image.as_deref().expect("image stored");
    assert!(image.starts_with("questions/") && image.ends_with(".png"));
    assert!(app.media_dir.path().join(image).exists());

    let served = app.get(&format!("/media/{}", image)).await;
    assert_eq!(served.status().as_u16(), 200);
}

#[tokio::test]
async fn invalid_correct_letter_rerenders_form() {
    let app = spawn_app().await;
    app.logged_in_as("boss", true).await;
    let token = app.csrf_from("/admin-panel/questions/add/").await;

    let form = question_form(&token, "Savol", &["Ha", "Yo'q"], "D");
    let response = post_multipart(&app, "/admin-panel/questions/add/", form).await;

    assert_eq!(response.status().as_u16(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("alert-danger"));
    assert!(body.contains("Yo&#39;q") || body.contains("Yo'q"));
    assert_eq!(db::questions::count(&app.pool).await.unwrap(), 0);
}

#[tokio::test]
async fn admin_edits_and_deletes_question() {
    let app = spawn_app().await;
    app.logged_in_as("boss", true).await;
    let id = app.create_question("Eski matn", "A").await;
    let edit_path = format!("/admin-panel/questions/{}/edit/", id);
    let token = app.csrf_from(&edit_path).await;

    let form = question_form(&token, "Yangi matn", &["Bir", "Ikki", "Uch", "To'rt", "Besh"], "e");
    let response = post_multipart(&app, &edit_path, form).await;
    assert_eq!(response.status().as_u16(), 303);

    let question = db::questions::find(&app.pool, id).await.unwrap().unwrap();
    assert_eq!(question.text, "Yangi matn");
    assert_eq!(question.variants.len(), 5);
    assert_eq!(question.correct_answer, "E");
    assert_eq!(question.number, 1);

    let response = app
        .post_form(
            &format!("/admin-panel/questions/{}/delete/", id),
            &[("csrf_token", &token)],
        )
        .await;
    assert_eq!(location(&response), "/admin-panel/questions/");
    assert!(db::questions::find(&app.pool, id).await.unwrap().is_none());

    let missing = app.get(&edit_path).await;
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn admin_manages_regular_users() {
    let app = spawn_app().await;
    let admin_id = app.logged_in_as("boss", true).await;
    let token = app.csrf_from("/admin-panel/users/add/").await;

    let response = app
        .post_form(
            "/admin-panel/users/add/",
            &[("username", "learner"), ("password", "secret-pass"), ("csrf_token", &token)],
        )
        .await;
    assert_eq!(location(&response), "/admin-panel/users/");

    let duplicate = app
        .post_form(
            "/admin-panel/users/add/",
            &[("username", "learner"), ("password", "other"), ("csrf_token", &token)],
        )
        .await;
    assert!(duplicate.text().await.unwrap().contains("Bu login allaqachon mavjud!"));

    let learner = db::users::find_by_username(&app.pool, "learner")
        .await
        .unwrap()
        .unwrap();
    assert!(!learner.is_staff);

    let response = app
        .post_form(
            &format!("/admin-panel/users/{}/edit/", learner.id),
            &[("username", "learner2"), ("password", ""), ("csrf_token", &token)],
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let renamed = db::users::find_by_id(&app.pool, learner.id).await.unwrap().unwrap();
    assert_eq!(renamed.username, "learner2");
    assert_eq!(renamed.password_hash, learner.password_hash);

    let list = app.get("/admin-panel/users/").await.text().await.unwrap();
    assert!(list.contains("learner2"));
    assert!(!list.contains(">boss<"));

    // Staff accounts are out of reach.
    let staff = app.get(&format!("/admin-panel/users/{}/edit/", admin_id)).await;
    assert_eq!(staff.status().as_u16(), 404);
    let staff_delete = app
        .post_form(
            &format!("/admin-panel/users/{}/delete/", admin_id),
            &[("csrf_token", &token)],
        )
        .await;
    assert_eq!(staff_delete.status().as_u16(), 404);

    let response = app
        .post_form(
            &format!("/admin-panel/users/{}/delete/", learner.id),
            &[("csrf_token", &token)],
        )
        .await;
    assert_eq!(location(&response), "/admin-panel/users/");
    assert!(db::users::find_by_id(&app.pool, learner.id).await.unwrap().is_none());
}

#[tokio::test]
async fn admin_dashboard_and_statistics_render() {
    let app = spawn_app().await;
    let learner = app.create_user("learner", false).await;
    let question = app.create_question("Savol", "A").await;
    let session = db::sessions::create(&app.pool, learner, &[question]).await.unwrap();
    let answers = [(question, "A".to_string())].into_iter().collect();
    db::sessions::submit(&app.pool, session.id, learner, &answers, 30)
        .await
        .unwrap();

    app.logged_in_as("boss", true).await;

    let dashboard = app.get("/admin-panel/").await;
    assert_eq!(dashboard.status().as_u16(), 200);
    let body = dashboard.text().await.unwrap();
    assert!(body.contains("learner"));
    assert!(body.contains("100%"));

    let stats = app.get("/admin-panel/statistics/").await.text().await.unwrap();
    assert!(stats.contains("learner"));
    assert!(stats.contains("100%"));
}

#[tokio::test]
async fn admin_posts_require_csrf() {
    let app = spawn_app().await;
    app.logged_in_as("boss", true).await;
    let id = app.create_question("Savol", "A").await;

    let response = app
        .post_form(
            &format!("/admin-panel/questions/{}/delete/", id),
            &[("csrf_token", "forged")],
        )
        .await;

    assert_eq!(response.status().as_u16(), 403);
    assert!(db::questions::find(&app.pool, id).await.unwrap().is_some());
}

fn stored_images(app: &TestApp) -> usize {
    std::fs::read_dir(app.media_dir.path().join("questions"))
        .map(|dir| dir.count())
        .unwrap_or(0)
}

fn png(name: &str) -> Part {
    Part::bytes(b"\x89PNG fake".to_vec())
        .file_name(name.to_string())
        .mime_str("image/png")
        .unwrap()
}

/// Makes every insert or update that repeats an existing text a UNIQUE
/// violation, so the failure paths run deterministically.
async fn make_text_unique(app: &TestApp) {
    sqlx::query("CREATE UNIQUE INDEX questions_text_unique ON questions(text)")
        .execute(&app.pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn failed_insert_rerenders_form_and_drops_upload() {
    let app = spawn_app().await;
    app.logged_in_as("boss", true).await;
    app.create_question("Takroriy savol", "A").await;
    make_text_unique(&app).await;
    let token = app.csrf_from("/admin-panel/questions/add/").await;

    let form = question_form(&token, "Takroriy savol", &["Ha", "Yo'q"], "A")
        .part("image", png("belgi.png"));
    let response = post_multipart(&app, "/admin-panel/questions/add/", form).await;

    assert_eq!(response.status().as_u16(), 200);
    assert!(response.text().await.unwrap().contains("alert-danger"));
    assert_eq!(db::questions::count(&app.pool).await.unwrap(), 1);
    assert_eq!(stored_images(&app), 0);
}

#[tokio::test]
async fn failed_update_drops_new_upload_and_keeps_old_image() {
    let app = spawn_app().await;
    app.logged_in_as("boss", true).await;
    app.create_question("Birinchi savol", "A").await;
    let token = app.csrf_from("/admin-panel/questions/add/").await;

    let form = question_form(&token, "Ikkinchi savol", &["Ha", "Yo'q"], "A")
        .part("image", png("eski.png"));
    post_multipart(&app, "/admin-panel/questions/add/", form).await;
    let second = db::questions::list_all(&app.pool).await.unwrap().remove(1);
    let old_image = second.image.clone().expect("image stored");
    assert_eq!(stored_images(&app), 1);

    make_text_unique(&app).await;
    let form = question_form(&token, "Birinchi savol", &["Ha", "Yo'q"], "A")
        .part("image", png("yangi.png"));
    let response = post_multipart(
        &app,
        &format!("/admin-panel/questions/{}/edit/", second.id),
        form,
    )
    .await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(stored_images(&app), 1);
    assert!(app.media_dir.path().join(&old_image).exists());
    let unchanged = db::questions::find(&app.pool, second.id).await.unwrap().unwrap();
    assert_eq!(unchanged.text, "Ikkinchi savol");
    assert_eq!(unchanged.image.as_deref(), Some(old_image.as_str()));
}
