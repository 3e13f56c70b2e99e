use std::collections::HashSet;

use maud::{Markup, html};

use super::{PageContext, csrf_field, layout, question_image, question_text};
use crate::{models::question::Question, utils::html::{strip_tags, truncate_words}};

pub struct QuestionListView<'a> {
    pub questions: &'a [Question],
    pub bookmarked: &'a HashSet<i64>,
}

pub struct QuestionDetailView<'a> {
    pub question: &'a Question,
    pub is_bookmarked: bool,
}

pub struct SearchView<'a> {
    pub query: &'a str,
    pub questions: &'a [Question],
    pub bookmarked: &'a HashSet<i64>,
}

pub struct BookmarksView<'a> {
    pub questions: &'a [Question],
}

/// Bookmark toggle form; main.js upgrades it to an XHR call.
pub fn bookmark_button(csrf_token: &str, question_id: i64, is_bookmarked: bool) -> Markup {
    html! {
        form.bookmark-form method="post" action={ "/bookmark/toggle/" (question_id) "/" } {
            (csrf_field(csrf_token))
            @if is_bookmarked {
                button.btn.btn-warning type="submit" { "★ Saqlangan" }
            } @else {
                button.btn.btn-outline type="submit" { "☆ Saqlash" }
            }
        }
    }
}

fn question_card(ctx: &PageContext, question: &Question, is_bookmarked: bool) -> Markup {
    html! {
        div.question-card {
            div.question-header {
                a.question-number href={ "/questions/" (question.id) "/" } { "№" (question.number) }
                (bookmark_button(ctx.csrf_token, question.id, is_bookmarked))
            }
            p.question-preview { (truncate_words(&strip_tags(&question.text), 25)) }
            @if question.image.is_some() {
                span.badge { "Rasm" }
            }
        }
    }
}

fn question_grid(ctx: &PageContext, questions: &[Question], bookmarked: &HashSet<i64>) -> Markup {
    html! {
        div.question-grid {
            @for question in questions {
                (question_card(ctx, question, bookmarked.contains(&question.id)))
            }
        }
    }
}

pub fn question_list_page(ctx: &PageContext, view: &QuestionListView) -> Markup {
    layout(
        "Savollar",
        ctx,
        html! {
            h1 { "Barcha savollar (" (view.questions.len()) ")" }
            @if view.questions.is_empty() {
                p.empty { "Hozircha savollar yo'q." }
            } @else {
                (question_grid(ctx, view.questions, view.bookmarked))
            }
        },
    )
}

pub fn question_detail_page(ctx: &PageContext, view: &QuestionDetailView) -> Markup {
    let question = view.question;
    layout(
        &format!("Savol №{}", question.number),
        ctx,
        html! {
            div.question-detail {
                div.question-header {
                    h1 { "Savol №" (question.number) }
                    (bookmark_button(ctx.csrf_token, question.id, view.is_bookmarked))
                }
                (question_image(question))
                (question_text(question))
                ul.variants {
                    @for variant in &question.variants {
                        li.variant.correct[variant.letter == question.correct_answer] {
                            span.variant-letter { (variant.letter) }
                            span.variant-text { (variant.text) }
                        }
                    }
                }
                p.correct-answer { "To'g'ri javob: " strong { (question.correct_answer) } }
                a.btn href="/questions/" { "← Orqaga" }
            }
        },
    )
}

pub fn search_page(ctx: &PageContext, view: &SearchView) -> Markup {
    layout(
        "Qidiruv",
        ctx,
        html! {
            h1 { "Savollarni qidirish" }
            form.search-form method="get" action="/search/" {
                input type="search" name="q" value=(view.query) placeholder="Matn yoki savol raqami";
                button.btn.btn-primary type="submit" { "Qidirish" }
            }
            @if !view.query.is_empty() {
                p.result-count { "Topildi: " (view.questions.len()) }
                (question_grid(ctx, view.questions, view.bookmarked))
            }
        },
    )
}

pub fn bookmarks_page(ctx: &PageContext, view: &BookmarksView) -> Markup {
    let all: HashSet<i64> = view.questions.iter().map(|q| q.id).collect();
    layout(
        "Saqlanganlar",
        ctx,
        html! {
            h1 { "Saqlangan savollar" }
            @if view.questions.is_empty() {
                p.empty { "Siz hali hech qanday savolni saqlamagansiz." }
            } @else {
                (question_grid(ctx, view.questions, &all))
            }
        },
    )
}
