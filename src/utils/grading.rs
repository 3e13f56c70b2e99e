// src/utils/grading.rs

use std::collections::HashMap;

/// Grading outcome for one assigned question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: i64,
    /// Uppercased letter, empty when unanswered.
    pub selected: String,
    pub is_correct: bool,
}

/// Grading outcome for a whole submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grade {
    pub answers: Vec<GradedAnswer>,
    pub correct: i64,
    pub wrong: i64,
}

/// Normalizes a submitted letter: trimmed and uppercased.
pub fn normalize_letter(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Grades `submitted` letters against `answer_keys`, walking `question_ids`
/// in snapshot order.
///
/// Unanswered questions count as wrong with an empty selection. Questions
/// missing from `answer_keys` (deleted since the test started) are skipped.
pub fn grade(
    question_ids: &[i64],
    answer_keys: &HashMap<i64, String>,
    submitted: &HashMap<i64, String>,
) -> Grade {
    let mut grade = Grade::default();

    for &question_id in question_ids {
        let Some(key) = answer_keys.get(&question_id) else {
            continue;
        };

        let selected = submitted
            .get(&question_id)
            .map(|raw| normalize_letter(raw))
            .unwrap_or_default();

        let is_correct = !selected.is_empty() && selected == normalize_letter(key);
        if is_correct {
            grade.correct += 1;
        } else {
            grade.wrong += 1;
        }

        grade.answers.push(GradedAnswer {
            question_id,
            selected,
            is_correct,
        });
    }

    grade
}

/// Extracts `answer_<question id>` fields from a submitted form.
pub fn answers_from_form(form: &HashMap<String, String>) -> HashMap<i64, String> {
    form.iter()
        .filter_map(|(name, value)| {
            let id = name.strip_prefix("answer_")?.parse::<i64>().ok()?;
            Some((id, value.clone()))
        })
        .collect()
}
