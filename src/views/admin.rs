use maud::{Markup, html};

use super::{
    PageContext, alert, csrf_field, format_date, image_url, layout, score_class,
    stats::sessions_table,
};
use crate::{
    models::{
        question::{Question, VARIANT_LETTERS},
        test_session::SessionWithUser,
        user::User,
    },
    utils::html::{strip_tags, truncate_words},
};

pub struct AdminDashboardView<'a> {
    pub total_questions: i64,
    pub total_users: i64,
    pub total_tests: i64,
    pub recent_tests: &'a [SessionWithUser],
}

pub struct AdminQuestionsView<'a> {
    pub questions: &'a [Question],
}

/// Values echoed back into the question form.
#[derive(Debug, Default, Clone)]
pub struct QuestionFormValues {
    pub text: String,
    /// Indexed like `VARIANT_LETTERS`.
    pub variants: Vec<String>,
    pub correct_answer: String,
    pub image: Option<String>,
}

impl QuestionFormValues {
    pub fn from_question(question: &Question) -> Self {
        let variants = VARIANT_LETTERS
            .iter()
            .map(|letter| {
                let letter = letter.to_string();
                question
                    .variants
                    .iter()
                    .find(|v| v.letter == letter)
                    .map(|v| v.text.clone())
                    .unwrap_or_default()
            })
            .collect();
        Self {
            text: question.text.clone(),
            variants,
            correct_answer: question.correct_answer.clone(),
            image: question.image.clone(),
        }
    }
}

pub struct QuestionFormView<'a> {
    /// `None` when adding.
    pub question: Option<&'a Question>,
    pub values: &'a QuestionFormValues,
    pub error: Option<&'a str>,
}

pub struct AdminUsersView<'a> {
    pub users: &'a [User],
}

pub struct UserFormView<'a> {
    /// `None` when adding.
    pub edit_user: Option<&'a User>,
    pub username: &'a str,
    pub error: Option<&'a str>,
    pub success: Option<&'a str>,
}

pub struct UserStat<'a> {
    pub user: &'a User,
    pub total_tests: usize,
    pub avg_score: i64,
}

pub struct AdminStatisticsView<'a> {
    pub user_stats: &'a [UserStat<'a>],
}

fn delete_form(ctx: &PageContext, action: &str, confirm: &str) -> Markup {
    html! {
        form.inline-form method="post" action=(action)
            onsubmit={ "return confirm('" (confirm) "');" } {
            (csrf_field(ctx.csrf_token))
            button.btn.btn-danger.btn-sm type="submit" { "O'chirish" }
        }
    }
}

pub fn dashboard_page(ctx: &PageContext, view: &AdminDashboardView) -> Markup {
    let rows: Vec<(&str, _)> = view
        .recent_tests
        .iter()
        .map(|row| (row.username.as_str(), &row.session))
        .collect();
    layout(
        "Boshqaruv paneli",
        ctx,
        html! {
            h1 { "Boshqaruv paneli" }
            div.stat-grid {
                div.stat-card { div.stat-value { (view.total_questions) } div.stat-label { "Savollar" } }
                div.stat-card { div.stat-value { (view.total_users) } div.stat-label { "Foydalanuvchilar" } }
                div.stat-card { div.stat-value { (view.total_tests) } div.stat-label { "Testlar" } }
            }
            h2 { "So'nggi testlar" }
            @if rows.is_empty() {
                p.empty { "Hali test topshirilmagan." }
            } @else {
                (sessions_table(&rows, true))
            }
        },
    )
}

pub fn questions_page(ctx: &PageContext, view: &AdminQuestionsView) -> Markup {
    layout(
        "Savollar",
        ctx,
        html! {
            div.page-header {
                h1 { "Savollar (" (view.questions.len()) ")" }
                a.btn.btn-primary href="/admin-panel/questions/add/" { "+ Savol qo'shish" }
            }
            table.table {
                thead { tr { th { "№" } th { "Savol" } th { "Variantlar" } th { "Javob" } th { "Rasm" } th {} } }
                tbody {
                    @for question in view.questions {
                        tr {
                            td { (question.number) }
                            td { (truncate_words(&strip_tags(&question.text), 12)) }
                            td { (question.variants.len()) }
                            td { (question.correct_answer) }
                            td { @if question.image.is_some() { "✓" } }
                            td.actions {
                                a.btn.btn-sm href={ "/admin-panel/questions/" (question.id) "/edit/" } { "Tahrirlash" }
                                (delete_form(
                                    ctx,
                                    &format!("/admin-panel/questions/{}/delete/", question.id),
                                    "Savolni o'chirasizmi?",
                                ))
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn question_form_page(ctx: &PageContext, view: &QuestionFormView) -> Markup {
    let (title, action) = match view.question {
        Some(question) => (
            format!("Savol №{} ni tahrirlash", question.number),
            format!("/admin-panel/questions/{}/edit/", question.id),
        ),
        None => (
            "Yangi savol".to_string(),
            "/admin-panel/questions/add/".to_string(),
        ),
    };
    let values = view.values;

    layout(
        &title,
        ctx,
        html! {
            h1 { (title) }
            (alert("danger", view.error))
            form.question-form method="post" action=(action) enctype="multipart/form-data" {
                (csrf_field(ctx.csrf_token))
                label for="text" { "Savol matni" }
                textarea #text name="text" rows="4" required { (values.text) }

                @for (idx, letter) in VARIANT_LETTERS.iter().enumerate() {
                    @let name = format!("variant_{}", letter.to_ascii_lowercase());
                    label for=(name) { "Variant " (letter) }
                    input id=(name) type="text" name=(name)
                        value=(values.variants.get(idx).map(String::as_str).unwrap_or(""));
                }

                label for="correct_answer" { "To'g'ri javob (harf)" }
                input #correct_answer type="text" name="correct_answer" maxlength="1"
                    value=(values.correct_answer) required;

                label for="image" { "Rasm" }
                @if let Some(image) = &values.image {
                    div.current-image {
                        img.question-image src=(image_url(image)) alt="";
                        label { input type="checkbox" name="remove_image"; " Rasmni o'chirish" }
                    }
                }
                input #image type="file" name="image" accept="image/*";

                div.form-actions {
                    button.btn.btn-primary type="submit" { "Saqlash" }
                    a.btn href="/admin-panel/questions/" { "Bekor qilish" }
                }
            }
        },
    )
}

pub fn users_page(ctx: &PageContext, view: &AdminUsersView) -> Markup {
    layout(
        "Foydalanuvchilar",
        ctx,
        html! {
            div.page-header {
                h1 { "Foydalanuvchilar (" (view.users.len()) ")" }
                a.btn.btn-primary href="/admin-panel/users/add/" { "+ Foydalanuvchi qo'shish" }
            }
            table.table {
                thead { tr { th { "ID" } th { "Login" } th { "Ro'yxatdan o'tgan" } th {} } }
                tbody {
                    @for user in view.users {
                        tr {
                            td { (user.id) }
                            td { (user.username) }
                            td { (format_date(&user.date_joined)) }
                            td.actions {
                                a.btn.btn-sm href={ "/admin-panel/users/" (user.id) "/edit/" } { "Tahrirlash" }
                                (delete_form(
                                    ctx,
                                    &format!("/admin-panel/users/{}/delete/", user.id),
                                    "Foydalanuvchini o'chirasizmi?",
                                ))
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn user_form_page(ctx: &PageContext, view: &UserFormView) -> Markup {
    let (title, action) = match view.edit_user {
        Some(user) => (
            format!("{} ni tahrirlash", user.username),
            format!("/admin-panel/users/{}/edit/", user.id),
        ),
        None => (
            "Yangi foydalanuvchi".to_string(),
            "/admin-panel/users/add/".to_string(),
        ),
    };

    layout(
        &title,
        ctx,
        html! {
            h1 { (title) }
            (alert("danger", view.error))
            (alert("success", view.success))
            form.user-form method="post" action=(action) {
                (csrf_field(ctx.csrf_token))
                label for="username" { "Login" }
                input #username type="text" name="username" value=(view.username) required;
                label for="password" {
                    "Parol"
                    @if view.edit_user.is_some() { " (o'zgartirmaslik uchun bo'sh qoldiring)" }
                }
                input #password type="password" name="password" required[view.edit_user.is_none()];
                div.form-actions {
                    button.btn.btn-primary type="submit" { "Saqlash" }
                    a.btn href="/admin-panel/users/" { "Orqaga" }
                }
            }
        },
    )
}

pub fn statistics_page(ctx: &PageContext, view: &AdminStatisticsView) -> Markup {
    layout(
        "Statistika",
        ctx,
        html! {
            h1 { "Foydalanuvchilar statistikasi" }
            table.table {
                thead { tr { th { "Login" } th { "Testlar" } th { "O'rtacha ball" } } }
                tbody {
                    @for stat in view.user_stats {
                        tr {
                            td { (stat.user.username) }
                            td { (stat.total_tests) }
                            td { span class={ "score-badge " (score_class(stat.avg_score)) } { (stat.avg_score) "%" } }
                        }
                    }
                }
            }
        },
    )
}
