use maud::{Markup, html};

use super::{
    PageContext, alert, csrf_field, format_datetime, format_duration, layout, question_image,
    question_text, score_class,
};
use crate::models::{
    question::Question,
    test_session::{AnswerReview, TestSession},
};

pub struct StartTestView<'a> {
    pub total_available: i64,
    pub error: Option<&'a str>,
}

pub struct TakeTestView<'a> {
    pub session: &'a TestSession,
    pub questions: &'a [Question],
}

pub struct TestResultView<'a> {
    pub session: &'a TestSession,
    pub answers: &'a [AnswerReview],
}

pub fn start_test_page(ctx: &PageContext, view: &StartTestView) -> Markup {
    let suggested = view.total_available.clamp(1, 20);
    layout(
        "Test boshlash",
        ctx,
        html! {
            h1 { "Yangi test" }
            (alert("danger", view.error))
            p { "Bazada " strong { (view.total_available) } " ta savol mavjud." }
            @if view.total_available > 0 {
                form.start-form method="post" action="/test/start/" {
                    (csrf_field(ctx.csrf_token))
                    label for="num_questions" { "Savollar soni" }
                    input #num_questions type="number" name="num_questions"
                        min="1" max=(view.total_available) value=(suggested) required;
                    p.hint { "Har bir savol uchun 1 daqiqa vaqt beriladi." }
                    button.btn.btn-primary type="submit" { "Testni boshlash" }
                }
            }
        },
    )
}

pub fn take_test_page(ctx: &PageContext, view: &TakeTestView) -> Markup {
    let session = view.session;
    layout(
        "Test",
        ctx,
        html! {
            div.test-header {
                h1 { "Test #" (session.id) }
                div #timer .timer data-limit=(session.time_limit()) { (format_duration(session.time_limit())) }
            }
            form #test-form method="post" action={ "/test/" (session.id) "/submit/" } {
                (csrf_field(ctx.csrf_token))
                input #time_spent type="hidden" name="time_spent" value="0";
                @for (idx, question) in view.questions.iter().enumerate() {
                    div.test-question {
                        h3 { (idx + 1) ". Savol №" (question.number) }
                        (question_image(question))
                        (question_text(question))
                        div.variants {
                            @for variant in &question.variants {
                                label.variant-option {
                                    input type="radio" name={ "answer_" (question.id) } value=(variant.letter);
                                    span.variant-letter { (variant.letter) }
                                    span.variant-text { (variant.text) }
                                }
                            }
                        }
                    }
                }
                button.btn.btn-primary type="submit" { "Testni yakunlash" }
            }
        },
    )
}

pub fn test_result_page(ctx: &PageContext, view: &TestResultView) -> Markup {
    let session = view.session;
    let percent = session.score_percent();
    layout(
        "Natija",
        ctx,
        html! {
            h1 { "Test natijasi" }
            div.result-summary {
                div class={ "score " (score_class(percent)) } { (percent) "%" }
                ul {
                    li { "Jami savollar: " (session.total_questions) }
                    li.text-success { "To'g'ri: " (session.correct_answers) }
                    li.text-danger { "Noto'g'ri: " (session.wrong_answers) }
                    li { "Sarflangan vaqt: " (format_duration(session.time_spent)) }
                    li { "Sana: " (format_datetime(&session.created_at)) }
                }
            }
            @if !session.completed {
                p { "Test hali yakunlanmagan. " a href={ "/test/" (session.id) "/" } { "Davom etish" } }
            }
            div.review {
                @for (idx, review) in view.answers.iter().enumerate() {
                    @let question = &review.question;
                    div.review-item.correct[review.answer.is_correct].wrong[!review.answer.is_correct] {
                        h3 { (idx + 1) ". Savol №" (question.number) }
                        (question_image(question))
                        (question_text(question))
                        ul.variants {
                            @for variant in &question.variants {
                                li.variant
                                    .correct[variant.letter == question.correct_answer]
                                    .selected[variant.letter == review.answer.selected_answer] {
                                    span.variant-letter { (variant.letter) }
                                    span.variant-text { (variant.text) }
                                }
                            }
                        }
                        @if review.answer.selected_answer.is_empty() {
                            p.text-muted { "Javob berilmagan" }
                        } @else {
                            p { "Sizning javobingiz: " strong { (review.answer.selected_answer) } }
                        }
                    }
                }
            }
            a.btn.btn-primary href="/test/start/" { "Yangi test" }
        },
    )
}
