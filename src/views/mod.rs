// src/views/mod.rs
//
// Server-rendered pages. Each page takes a typed view struct; the layout
// only needs the viewer, the CSRF token and the active nav entry.

pub mod admin;
pub mod auth;
pub mod questions;
pub mod quiz;
pub mod stats;

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::models::{question::Question, user::User};

/// Navigation entries, used to highlight the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Dashboard,
    Questions,
    Search,
    Bookmarks,
    StartTest,
    Statistics,
    Profile,
    AdminDashboard,
    AdminQuestions,
    AdminUsers,
    AdminStatistics,
}

/// Data every authenticated page needs.
pub struct PageContext<'a> {
    pub user: &'a User,
    pub csrf_token: &'a str,
    pub nav: Nav,
}

fn head(title: &str) -> Markup {
    html! {
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            title { (title) " | AvtotestPrime" }
            link rel="stylesheet" href="/static/css/style.css";
        }
    }
}

fn nav_link(ctx: &PageContext, target: Nav, href: &str, label: &str) -> Markup {
    html! {
        a.nav-link.active[ctx.nav == target] href=(href) { (label) }
    }
}

/// Base layout with the role-specific navigation bar.
pub fn layout(title: &str, ctx: &PageContext, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="uz" {
            (head(title))
            body data-csrf=(ctx.csrf_token) {
                nav.navbar {
                    a.brand href="/" { "AvtotestPrime" }
                    button.nav-toggle type="button" onclick="toggleNav()" { "☰" }
                    div.nav-links {
                        @if ctx.user.is_staff {
                            (nav_link(ctx, Nav::AdminDashboard, "/admin-panel/", "Boshqaruv"))
                            (nav_link(ctx, Nav::AdminQuestions, "/admin-panel/questions/", "Savollar"))
                            (nav_link(ctx, Nav::AdminUsers, "/admin-panel/users/", "Foydalanuvchilar"))
                            (nav_link(ctx, Nav::AdminStatistics, "/admin-panel/statistics/", "Statistika"))
                        } @else {
                            (nav_link(ctx, Nav::Dashboard, "/dashboard/", "Bosh sahifa"))
                            (nav_link(ctx, Nav::Questions, "/questions/", "Savollar"))
                            (nav_link(ctx, Nav::Search, "/search/", "Qidiruv"))
                            (nav_link(ctx, Nav::Bookmarks, "/bookmarks/", "Saqlanganlar"))
                            (nav_link(ctx, Nav::StartTest, "/test/start/", "Test"))
                            (nav_link(ctx, Nav::Statistics, "/statistics/", "Statistika"))
                        }
                        (nav_link(ctx, Nav::Profile, "/profile/", "Profil"))
                        a.nav-link href="/logout/" { "Chiqish (" (ctx.user.username) ")" }
                    }
                }
                main.container { (content) }
                div id="imageModal" class="image-modal" onclick="closeImageModal()" {
                    img id="modalImage" alt="";
                }
                script src="/static/js/main.js" {}
            }
        }
    }
}

/// Standalone page for errors raised outside a page context.
pub fn error_page(status: StatusCode, message: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="uz" {
            (head(status.canonical_reason().unwrap_or("Error")))
            body {
                main.container.error-page {
                    h1 { (status.as_u16()) }
                    p { (message) }
                    a.btn href="/" { "Bosh sahifaga qaytish" }
                }
            }
        }
    }
}

pub fn csrf_field(token: &str) -> Markup {
    html! { input type="hidden" name="csrf_token" value=(token); }
}

pub fn alert(kind: &str, message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            div class={ "alert alert-" (kind) } { (message) }
        }
    }
}

/// CSS class for a score badge.
pub fn score_class(percent: i64) -> &'static str {
    if percent >= 80 {
        "score-good"
    } else if percent >= 50 {
        "score-ok"
    } else {
        "score-bad"
    }
}

pub fn format_datetime(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%d.%m.%Y %H:%M").to_string()
}

pub fn format_date(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%d.%m.%Y").to_string()
}

pub fn format_duration(seconds: i64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn image_url(path: &str) -> String {
    format!("/media/{}", path)
}

/// Question text is sanitized on save and rendered as-is.
pub fn question_text(question: &Question) -> Markup {
    html! { div.question-text { (PreEscaped(&question.text)) } }
}

pub fn question_image(question: &Question) -> Markup {
    html! {
        @if let Some(image) = &question.image {
            @let url = image_url(image);
            img.question-image src=(url) alt={ "Savol " (question.number) }
                onclick={ "openImageModal('" (url) "')" };
        }
    }
}
