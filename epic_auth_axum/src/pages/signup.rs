use askama::Template;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use epic_auth::{Auth, CoordinationError, NewUser};

use crate::config::EPIC_REDIRECT_USER;
use crate::error::status_for;
use crate::session::AuthUser;

use super::{Nav, render};

#[derive(Default, Deserialize)]
#[serde(default)]
pub(super) struct SignupForm {
    email: String,
    username: String,
    name: String,
    password: String,
    remember: Option<String>,
}

#[derive(Template, Default)]
#[template(path = "signup.j2", escape = "html")]
struct SignupTemplate {
    nav: Option<Nav>,
    email: String,
    username: String,
    name: String,
    errors: Vec<String>,
}

pub(super) async fn signup_page(user: Option<AuthUser>) -> Result<Response, (StatusCode, String)> {
    if user.is_some() {
        return Ok(Redirect::to(EPIC_REDIRECT_USER.as_str()).into_response());
    }
    Ok(render(&SignupTemplate::default())?.into_response())
}

pub(super) async fn signup(
    State(auth): State<Auth>,
    Form(form): Form<SignupForm>,
) -> Result<Response, (StatusCode, String)> {
    let new_user = NewUser {
        email: form.email.clone(),
        username: form.username.clone(),
        name: form.name.clone(),
        password: form.password,
        remember: form.remember.is_some(),
    };

    let (status, errors) = match auth.signup(new_user).await {
        Ok((user, headers)) => {
            tracing::debug!(user_id = %user.id, "Signed up");
            return Ok((headers, Redirect::to(EPIC_REDIRECT_USER.as_str())).into_response());
        }
        Err(CoordinationError::Validation(fields)) => (
            StatusCode::BAD_REQUEST,
            fields.into_iter().map(|f| f.message).collect(),
        ),
        Err(e @ CoordinationError::Conflict(_)) => (status_for(&e), vec![e.public_message()]),
        Err(e) => return Err((status_for(&e), e.public_message())),
    };

    let page = render(&SignupTemplate {
        nav: None,
        email: form.email,
        username: form.username,
        name: form.name,
        errors,
    })?;
    Ok((status, page).into_response())
}
