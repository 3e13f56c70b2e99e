use maud::{Markup, html};

use super::{PageContext, alert, csrf_field, format_date, format_datetime, format_duration, layout, score_class};
use crate::models::test_session::TestSession;

pub struct DashboardView {
    pub total_questions: i64,
    pub bookmark_count: i64,
    pub test_count: i64,
    pub avg_score: i64,
}

pub struct StatisticsView<'a> {
    pub total_tests: usize,
    pub avg_score: i64,
    pub best_score: i64,
    pub total_correct: i64,
    pub recent_sessions: &'a [TestSession],
}

pub struct ProfileView<'a> {
    pub error: Option<&'a str>,
    pub success: Option<&'a str>,
}

fn stat_card(label: &str, value: Markup) -> Markup {
    html! {
        div.stat-card {
            div.stat-value { (value) }
            div.stat-label { (label) }
        }
    }
}

pub fn dashboard_page(ctx: &PageContext, view: &DashboardView) -> Markup {
    layout(
        "Bosh sahifa",
        ctx,
        html! {
            h1 { "Xush kelibsiz, " (ctx.user.username) "!" }
            div.stat-grid {
                (stat_card("Jami savollar", html! { (view.total_questions) }))
                (stat_card("Saqlangan", html! { (view.bookmark_count) }))
                (stat_card("Topshirilgan testlar", html! { (view.test_count) }))
                (stat_card("O'rtacha ball", html! { (view.avg_score) "%" }))
            }
            div.actions {
                a.btn.btn-primary href="/test/start/" { "Test boshlash" }
                a.btn href="/questions/" { "Savollarni ko'rish" }
            }
        },
    )
}

/// Table of completed sessions, with an owner column when `show_user` is set.
/// Shared with the admin dashboard.
pub fn sessions_table(rows: &[(&str, &TestSession)], show_user: bool) -> Markup {
    html! {
        table.table {
            thead {
                tr {
                    @if show_user { th { "Foydalanuvchi" } }
                    th { "Sana" }
                    th { "Savollar" }
                    th { "To'g'ri" }
                    th { "Noto'g'ri" }
                    th { "Vaqt" }
                    th { "Ball" }
                }
            }
            tbody {
                @for (username, session) in rows {
                    @let percent = session.score_percent();
                    tr {
                        @if show_user { td { (username) } }
                        td { (format_datetime(&session.created_at)) }
                        td { (session.total_questions) }
                        td { (session.correct_answers) }
                        td { (session.wrong_answers) }
                        td { (format_duration(session.time_spent)) }
                        td { span class={ "score-badge " (score_class(percent)) } { (percent) "%" } }
                    }
                }
            }
        }
    }
}

pub fn statistics_page(ctx: &PageContext, view: &StatisticsView) -> Markup {
    let rows: Vec<(&str, &TestSession)> = view.recent_sessions.iter().map(|s| ("", s)).collect();
    layout(
        "Statistika",
        ctx,
        html! {
            h1 { "Mening statistikam" }
            div.stat-grid {
                (stat_card("Testlar", html! { (view.total_tests) }))
                (stat_card("O'rtacha ball", html! { (view.avg_score) "%" }))
                (stat_card("Eng yaxshi natija", html! { (view.best_score) "%" }))
                (stat_card("Jami to'g'ri javoblar", html! { (view.total_correct) }))
            }
            h2 { "So'nggi testlar" }
            @if view.recent_sessions.is_empty() {
                p.empty { "Hali test topshirilmagan." }
            } @else {
                (sessions_table(&rows, false))
            }
        },
    )
}

pub fn profile_page(ctx: &PageContext, view: &ProfileView) -> Markup {
    layout(
        "Profil",
        ctx,
        html! {
            h1 { "Profil" }
            (alert("danger", view.error))
            (alert("success", view.success))
            dl.profile-info {
                dt { "Login" } dd { (ctx.user.username) }
                dt { "Ro'yxatdan o'tgan" } dd { (format_date(&ctx.user.date_joined)) }
            }
            form.profile-form method="post" action="/profile/" {
                (csrf_field(ctx.csrf_token))
                label for="new_username" { "Yangi login" }
                input #new_username type="text" name="new_username" placeholder=(ctx.user.username);
                label for="new_password" { "Yangi parol" }
                input #new_password type="password" name="new_password";
                button.btn.btn-primary type="submit" { "Saqlash" }
            }
        },
    )
}
