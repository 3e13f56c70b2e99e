// tests/quiz_tests.rs

mod common;

use std::collections::HashSet;

use avtotest::{db, models::test_session::TestSession};
use common::{TestApp, location, spawn_app};

/// Starts a test through the form and returns the new session.
async fn start_test(app: &TestApp, user_id: i64, requested: &str) -> TestSession {
    let token = app.csrf_from("/test/start/").await;
    let response = app
        .post_form(
            "/test/start/",
            &[("num_questions", requested), ("csrf_token", &token)],
        )
        .await;
    assert_eq!(response.status().as_u16(), 303);

    let target = location(&response);
    let id: i64 = target
        .trim_start_matches("/test/")
        .trim_end_matches('/')
        .parse()
        .expect("redirect to /test/{id}/");

    db::sessions::find_for_user(&app.pool, id, user_id)
        .await
        .unwrap()
        .expect("session stored")
}

/// Submits `answers` (question id, letter) for a session.
async fn submit(app: &TestApp, session_id: i64, answers: &[(i64, &str)]) -> reqwest::Response {
    let token = app.csrf_from("/test/start/").await;
    let mut form: Vec<(String, String)> = answers
        .iter()
        .map(|(id, letter)| (format!("answer_{}", id), letter.to_string()))
        .collect();
    form.push(("time_spent".to_string(), "95".to_string()));
    form.push(("csrf_token".to_string(), token));

    app.client
        .post(app.url(&format!("/test/{}/submit/", session_id)))
        .form(&form)
        .send()
        .await
        .unwrap()
}

fn wrong_letter(correct: &str) -> &'static str {
    if correct == "A" { "B" } else { "A" }
}

#[tokio::test]
async fn end_to_end_three_right_two_wrong_rest_blank() {
    let app = spawn_app().await;
    let user_id = app.logged_in_as("driver", false).await;
    for i in 0..10 {
        app.create_question(&format!("Savol {}", i), "C").await;
    }

    let session = start_test(&app, user_id, "10").await;
    let ids = session.question_ids.0.clone();
    assert_eq!(ids.len(), 10);

    let answers: Vec<(i64, &str)> = ids[..3]
        .iter()
        .map(|id| (*id, "c"))
        .chain(ids[3..5].iter().map(|id| (*id, wrong_letter("C"))))
        .collect();

    let response = submit(&app, session.id, &answers).await;
    assert_eq!(location(&response), format!("/test/{}/result/", session.id));

    let done = db::sessions::find_for_user(&app.pool, session.id, user_id)
        .await
        .unwrap()
        .unwrap();
    assert!(done.completed);
    assert_eq!(done.correct_answers, 3);
    assert_eq!(done.wrong_answers, 7);
    assert_eq!(done.time_spent, 95);
    assert_eq!(done.score_percent(), 30);

    let reviews = db::sessions::answers_with_questions(&app.pool, session.id)
        .await
        .unwrap();
    assert_eq!(reviews.len(), 10);
    let blanks = reviews
        .iter()
        .filter(|r| r.answer.selected_answer.is_empty())
        .count();
    assert_eq!(blanks, 5);
    assert!(reviews.iter().all(|r| r.answer.is_correct == (r.answer.selected_answer == "C")));

    let page = app
        .get(&format!("/test/{}/result/", session.id))
        .await
        .text()
        .await
        .unwrap();
    assert!(page.contains("30%"));
}

#[tokio::test]
async fn blank_answers_count_as_wrong() {
    let app = spawn_app().await;
    let user_id = app.logged_in_as("driver", false).await;
    for i in 0..6 {
        app.create_question(&format!("Savol {}", i), "A").await;
    }

    let session = start_test(&app, user_id, "6").await;
    let ids = &session.question_ids.0;
    let answers = vec![
        (ids[0], "A"),
        (ids[1], "A"),
        (ids[2], "A"),
        (ids[3], "D"),
        (ids[4], "B"),
        (ids[5], ""),
    ];
    submit(&app, session.id, &answers).await;

    let done = db::sessions::find_for_user(&app.pool, session.id, user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!((done.correct_answers, done.wrong_answers), (3, 3));
    assert_eq!(done.score_percent(), 50);
}

#[tokio::test]
async fn resubmission_never_changes_counters() {
    let app = spawn_app().await;
    let user_id = app.logged_in_as("driver", false).await;
    for i in 0..4 {
        app.create_question(&format!("Savol {}", i), "B").await;
    }

    let session = start_test(&app, user_id, "4").await;
    let ids = session.question_ids.0.clone();
    submit(&app, session.id, &[(ids[0], "B")]).await;

    let all_right: Vec<(i64, &str)> = ids.iter().map(|id| (*id, "B")).collect();
    let again = submit(&app, session.id, &all_right).await;
    assert_eq!(location(&again), format!("/test/{}/result/", session.id));

    let done = db::sessions::find_for_user(&app.pool, session.id, user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!((done.correct_answers, done.wrong_answers), (1, 3));

    let stored = db::sessions::answers_with_questions(&app.pool, session.id)
        .await
        .unwrap();
    assert_eq!(stored.len(), 4);

    // A completed test is no longer takeable.
    let response = app.get(&format!("/test/{}/", session.id)).await;
    assert_eq!(location(&response), format!("/test/{}/result/", session.id));
}

#[tokio::test]
async fn requested_count_is_clamped_and_distinct() {
    let app = spawn_app().await;
    let user_id = app.logged_in_as("driver", false).await;
    for i in 0..10 {
        app.create_question(&format!("Savol {}", i), "A").await;
    }

    let five = start_test(&app, user_id, "5").await;
    let distinct: HashSet<i64> = five.question_ids.0.iter().copied().collect();
    assert_eq!(five.total_questions, 5);
    assert_eq!(distinct.len(), 5);

    let too_many = start_test(&app, user_id, "50").await;
    assert_eq!(too_many.total_questions, 10);

    let zero = start_test(&app, user_id, "0").await;
    assert_eq!(zero.total_questions, 1);
}

#[tokio::test]
async fn empty_bank_creates_no_session() {
    let app = spawn_app().await;
    let user_id = app.logged_in_as("driver", false).await;
    // The start page shows no form for an empty bank.
    let token = app.csrf_from("/profile/").await;

    let response = app
        .post_form("/test/start/", &[("num_questions", "5"), ("csrf_token", &token)])
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert!(response.text().await.unwrap().contains("test tuzib bo'lmaydi"));
    assert_eq!(
        db::sessions::count_completed_for_user(&app.pool, user_id).await.unwrap(),
        0
    );
    let open = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM test_sessions")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(open, 0);
}

#[tokio::test]
async fn sessions_are_private_to_their_owner() {
    let app = spawn_app().await;
    let owner = app.logged_in_as("owner", false).await;
    app.create_question("Savol", "A").await;
    let session = start_test(&app, owner, "1").await;

    app.get("/logout/").await;
    app.logged_in_as("intruder", false).await;

    let take = app.get(&format!("/test/{}/", session.id)).await;
    assert_eq!(location(&take), "/test/start/");

    let result = app.get(&format!("/test/{}/result/", session.id)).await;
    assert_eq!(result.status().as_u16(), 404);

    let token = app.csrf_from("/test/start/").await;
    let submit = app
        .post_form(
            &format!("/test/{}/submit/", session.id),
            &[("csrf_token", &token)],
        )
        .await;
    assert_eq!(submit.status().as_u16(), 404);
}

#[tokio::test]
async fn statistics_average_completed_tests() {
    let app = spawn_app().await;
    let user_id = app.logged_in_as("driver", false).await;
    for i in 0..4 {
        app.create_question(&format!("Savol {}", i), "A").await;
    }

    // 100% then 25%
    let first = start_test(&app, user_id, "4").await;
    let all: Vec<(i64, &str)> = first.question_ids.0.iter().map(|id| (*id, "A")).collect();
    submit(&app, first.id, &all).await;

    let second = start_test(&app, user_id, "4").await;
    submit(&app, second.id, &[(second.question_ids.0[0], "A")]).await;

    let page = app.get("/statistics/").await.text().await.unwrap();
    assert!(page.contains("62%"));
    assert!(page.contains("100%"));
}
