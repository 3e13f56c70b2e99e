use maud::{DOCTYPE, Markup, html};

use super::{alert, csrf_field, head};

pub struct LoginView<'a> {
    pub csrf_token: &'a str,
    pub username: &'a str,
    pub error: Option<&'a str>,
}

pub fn login_page(view: &LoginView) -> Markup {
    html! {
        (DOCTYPE)
        html lang="uz" {
            (head("Kirish"))
            body.login-body {
                main.login-card {
                    h1 { "AvtotestPrime" }
                    p.subtitle { "Haydovchilik guvohnomasi imtihoniga tayyorgarlik" }
                    (alert("danger", view.error))
                    form method="post" action="/login/" {
                        (csrf_field(view.csrf_token))
                        label for="username" { "Login" }
                        input #username type="text" name="username" value=(view.username) required autofocus;
                        label for="password" { "Parol" }
                        input #password type="password" name="password" required;
                        button.btn.btn-primary type="submit" { "Kirish" }
                    }
                }
            }
        }
    }
}
