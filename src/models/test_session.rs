// src/models/test_session.rs

use serde::Serialize;
use sqlx::{FromRow, types::Json};

use crate::models::question::Question;

/// Advisory seconds per question shown by the client-side countdown.
pub const SECONDS_PER_QUESTION: i64 = 60;

/// Lifecycle of an attempt. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Completed,
}

/// Represents the 'test_sessions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestSession {
    pub id: i64,
    pub user_id: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,

    /// Seconds reported by the client at submission.
    pub time_spent: i64,
    pub completed: bool,

    /// Question ids assigned at creation, in presentation order.
    pub question_ids: Json<Vec<i64>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl TestSession {
    pub fn state(&self) -> SessionState {
        if self.completed {
            SessionState::Completed
        } else {
            SessionState::InProgress
        }
    }

    pub fn score_percent(&self) -> i64 {
        score_percent(self.correct_answers, self.total_questions)
    }

    pub fn time_limit(&self) -> i64 {
        self.total_questions * SECONDS_PER_QUESTION
    }
}

/// A completed session joined with its owner's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionWithUser {
    #[sqlx(flatten)]
    pub session: TestSession,
    pub username: String,
}

/// Represents the 'test_answers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestAnswer {
    pub id: i64,
    pub session_id: i64,
    pub question_id: i64,

    /// Uppercase letter, empty when the question was skipped.
    pub selected_answer: String,
    pub is_correct: bool,
}

/// One reviewed answer on the result page.
#[derive(Debug, Clone)]
pub struct AnswerReview {
    pub answer: TestAnswer,
    pub question: Question,
}

/// Truncated percentage of correct answers; 0 for an empty session.
pub fn score_percent(correct: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    correct * 100 / total
}

/// Integer mean of session scores, 0 when there are none.
pub fn average_score(sessions: &[TestSession]) -> i64 {
    if sessions.is_empty() {
        return 0;
    }
    let sum: i64 = sessions.iter().map(TestSession::score_percent).sum();
    sum / sessions.len() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(correct: i64, total: i64) -> TestSession {
        TestSession {
            id: 1,
            user_id: 1,
            total_questions: total,
            correct_answers: correct,
            wrong_answers: total - correct,
            time_spent: 0,
            completed: true,
            question_ids: Json(Vec::new()),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn score_truncates() {
        assert_eq!(score_percent(0, 0), 0);
        assert_eq!(score_percent(3, 4), 75);
        assert_eq!(score_percent(1, 3), 33);
        assert_eq!(score_percent(2, 3), 66);
        assert_eq!(score_percent(5, 5), 100);
    }

    #[test]
    fn average_of_percents() {
        assert_eq!(average_score(&[]), 0);
        assert_eq!(average_score(&[session(1, 3), session(3, 4)]), 54);
    }

    #[test]
    fn state_follows_completed_flag() {
        let mut s = session(0, 2);
        assert_eq!(s.state(), SessionState::Completed);
        s.completed = false;
        assert_eq!(s.state(), SessionState::InProgress);
        assert_eq!(s.time_limit(), 120);
    }
}
