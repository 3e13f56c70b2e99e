// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// Letters offered by the authoring form, in display order.
pub const VARIANT_LETTERS: [char; 10] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// One labeled answer choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub letter: String,
    pub text: String,
}

impl Variant {
    pub fn new(letter: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            letter: letter.into(),
            text: text.into(),
        }
    }
}

/// The four fixed A-D columns older rows were written with.
/// Only consulted when the ordered list is empty.
#[derive(Debug, Clone, Default)]
pub struct LegacyVariants {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl LegacyVariants {
    /// Non-blank fields become variants, keeping A-D order.
    pub fn into_variants(self) -> Vec<Variant> {
        [("A", self.a), ("B", self.b), ("C", self.c), ("D", self.d)]
            .into_iter()
            .filter(|(_, text)| !text.is_empty())
            .map(|(letter, text)| Variant::new(letter, text))
            .collect()
    }
}

/// Picks the displayable variants: the stored list when it has entries,
/// otherwise the legacy fixed fields.
pub fn resolve_variants(list: Vec<Variant>, legacy: LegacyVariants) -> Vec<Variant> {
    if list.is_empty() {
        legacy.into_variants()
    } else {
        list
    }
}

/// Raw 'questions' row, including the legacy variant columns.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub number: i64,
    pub text: String,
    pub image: String,
    pub variants_json: Json<Vec<Variant>>,
    pub correct_answer: String,
    pub variant_a: String,
    pub variant_b: String,
    pub variant_c: String,
    pub variant_d: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A quiz question with its variants resolved to the ordered list form.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: i64,

    /// Human-facing number, unique across the bank.
    pub number: i64,

    /// Sanitized HTML.
    pub text: String,

    /// Path relative to the media root, e.g. `questions/1700000000.png`.
    pub image: Option<String>,

    pub variants: Vec<Variant>,

    /// Uppercase letter of the right variant.
    pub correct_answer: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        let legacy = LegacyVariants {
            a: row.variant_a,
            b: row.variant_b,
            c: row.variant_c,
            d: row.variant_d,
        };
        Self {
            id: row.id,
            number: row.number,
            text: row.text,
            image: Some(row.image).filter(|path| !path.is_empty()),
            variants: resolve_variants(row.variants_json.0, legacy),
            correct_answer: row.correct_answer,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Question {
    /// Substring match over text, variant texts and number. `needle` must
    /// already be lowercased; both sides fold with Unicode rules.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle)
            || self.number.to_string().contains(needle)
            || self
                .variants
                .iter()
                .any(|v| v.text.to_lowercase().contains(needle))
    }

    /// Text of the correct variant, if the letter names one.
    pub fn correct_text(&self) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.letter == self.correct_answer)
            .map(|v| v.text.as_str())
    }
}

/// Validated input for creating or editing a question.
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub text: String,
    pub variants: Vec<Variant>,
    pub correct_answer: String,
}
