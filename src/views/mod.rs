//! HTML views.
//!
//! Each page is a struct implementing [`Template`]; [`render`] wraps its body in
//! the shared layout. Every value interpolated into markup goes through
//! [`escape`].

pub mod admin;
pub mod auth;
pub mod blog;
pub mod error;
pub mod home;

use actix_web::{http::StatusCode, HttpResponse};
use validator::ValidationErrors;

use crate::{
    models::users::User,
    session::{Flash, Session},
};

pub trait Template {
    fn title(&self) -> String;
    fn body(&self) -> String;
}

/// Data every page needs besides its own.
#[derive(Default)]
pub struct PageContext {
    pub user: Option<User>,
    pub flashes: Vec<Flash>,
}

impl PageContext {
    pub fn new(session: &Session, user: Option<User>) -> Self {
        Self {
            user,
            flashes: session.take_flashes(),
        }
    }
}

pub fn render<T: Template>(template: &T, ctx: &PageContext, status: StatusCode) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(layout(&template.title(), &template.body(), ctx))
}

fn layout(title: &str, body: &str, ctx: &PageContext) -> String {
    let account = match &ctx.user {
        Some(user) if user.is_admin() => format!(
            r#"<a href="/admin">Admin</a> <span class="user">{}</span> <a href="/logout">Log out</a>"#,
            escape(&user.username)
        ),
        Some(user) => format!(
            r#"<span class="user">{}</span> <a href="/logout">Log out</a>"#,
            escape(&user.username)
        ),
        None => r#"<a href="/login">Log in</a> <a href="/register">Register</a>"#.to_string(),
    };

    let flashes: String = ctx
        .flashes
        .iter()
        .map(|flash| {
            format!(
                r#"<p class="flash flash-{}">{}</p>"#,
                escape(&flash.kind),
                escape(&flash.message)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<header><nav><a href="/home">Home</a> <a href="/posts">Blog</a> {account}</nav></header>
<main>
{flashes}{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        account = account,
        flashes = flashes,
        body = body,
    )
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes and keeps line breaks of user-written text.
pub fn paragraphs(s: &str) -> String {
    s.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape(p).replace('\n', "<br>")))
        .collect()
}

pub fn csrf_field(name: &str, token: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}">"#,
        escape(name),
        escape(token)
    )
}

/// A POST form holding only a CSRF field and a submit button.
pub fn button_form(action: &str, field: &str, token: &str, label: &str) -> String {
    format!(
        r#"<form method="post" action="{}" class="inline">{}<button type="submit">{}</button></form>"#,
        escape(action),
        csrf_field(field, token),
        escape(label)
    )
}

pub fn violations(errors: &ValidationErrors) -> Vec<String> {
    let mut out: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(move |err| format!("{} {}", field, describe(&err.code)))
        })
        .collect();
    out.sort();
    out
}

fn describe(code: &str) -> &'static str {
    match code {
        "length" => "has an invalid length",
        "email" => "must be a valid email address",
        "must_match" => "does not match",
        _ => "is invalid",
    }
}

pub fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", escape(e)))
        .collect();
    format!(r#"<ul class="errors">{}</ul>"#, items)
}
