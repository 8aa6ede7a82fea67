use askama::Template;
use axum::{http::StatusCode, response::Html};

use crate::session::AuthUser;

use super::{Nav, nav_for, render};

#[derive(Template)]
#[template(path = "index.j2", escape = "html")]
struct IndexTemplate {
    nav: Option<Nav>,
    greeting: String,
}

pub(super) async fn index(user: Option<AuthUser>) -> Result<Html<String>, (StatusCode, String)> {
    let greeting = match &user {
        Some(u) => format!("Hello, {}!", u.name),
        None => "Welcome to Epic Notes".to_string(),
    };
    render(&IndexTemplate {
        nav: nav_for(user.as_ref()),
        greeting,
    })
}
