use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{TypedHeader, headers};
use serde::Deserialize;

use epic_auth::{Auth, CoordinationError, LoginOutcome, LoginRequest, safe_redirect};

use crate::config::{EPIC_LOGIN_URL, EPIC_REDIRECT_USER};
use crate::error::status_for;
use crate::session::AuthUser;

use super::{CodeForm, LOGIN_TWO_FACTOR_PATH, Nav, render};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct RedirectQuery {
    redirect_to: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct LoginForm {
    username: String,
    password: String,
    remember: Option<String>,
    redirect_to: Option<String>,
}

#[derive(Template)]
#[template(path = "login.j2", escape = "html")]
struct LoginTemplate {
    nav: Option<Nav>,
    username: String,
    redirect_to: String,
    error: String,
}

#[derive(Template)]
#[template(path = "login_two_factor.j2", escape = "html")]
struct LoginTwoFactorTemplate {
    nav: Option<Nav>,
    error: String,
}

pub(super) async fn login_page(
    user: Option<AuthUser>,
    Query(query): Query<RedirectQuery>,
) -> Result<Response, (StatusCode, String)> {
    if user.is_some() {
        let target = safe_redirect(query.redirect_to.as_deref(), EPIC_REDIRECT_USER.as_str());
        return Ok(Redirect::to(&target).into_response());
    }

    let page = render(&LoginTemplate {
        nav: None,
        username: String::new(),
        redirect_to: safe_redirect(query.redirect_to.as_deref(), ""),
        error: String::new(),
    })?;
    Ok(page.into_response())
}

/// Password step
pub(super) async fn login(
    State(auth): State<Auth>,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    let request = LoginRequest {
        username: form.username.clone(),
        password: form.password,
        remember: form.remember.is_some(),
        redirect_to: Some(safe_redirect(
            form.redirect_to.as_deref(),
            EPIC_REDIRECT_USER.as_str(),
        )),
    };

    match auth.login(request).await {
        Ok(LoginOutcome::LoggedIn {
            headers,
            redirect_to,
        }) => Ok((headers, Redirect::to(&redirect_to)).into_response()),
        Ok(LoginOutcome::TwoFactorRequired(headers)) => {
            Ok((headers, Redirect::to(LOGIN_TWO_FACTOR_PATH)).into_response())
        }
        Err(e @ (CoordinationError::InvalidCredentials | CoordinationError::Validation(_))) => {
            let page = render(&LoginTemplate {
                nav: None,
                username: form.username,
                redirect_to: safe_redirect(form.redirect_to.as_deref(), ""),
                error: CoordinationError::InvalidCredentials.public_message(),
            })?;
            Ok((status_for(&e), page).into_response())
        }
        Err(e) => Err((status_for(&e), e.public_message())),
    }
}

pub(super) async fn two_factor_page(
    State(auth): State<Auth>,
    user: Option<AuthUser>,
    cookies: Option<TypedHeader<headers::Cookie>>,
) -> Result<Response, (StatusCode, String)> {
    if user.is_some() {
        return Ok(Redirect::to(EPIC_REDIRECT_USER.as_str()).into_response());
    }

    let pending = cookies.map(|TypedHeader(cookies)| auth.pending_login(&cookies));
    match pending {
        Some(Ok(_)) => Ok(render(&LoginTwoFactorTemplate {
            nav: None,
            error: String::new(),
        })?
        .into_response()),
        _ => Ok(Redirect::to(EPIC_LOGIN_URL.as_str()).into_response()),
    }
}

/// Code step; a session only exists once this succeeds
pub(super) async fn two_factor(
    State(auth): State<Auth>,
    cookies: Option<TypedHeader<headers::Cookie>>,
    Form(form): Form<CodeForm>,
) -> Result<Response, (StatusCode, String)> {
    let Some(TypedHeader(cookies)) = cookies else {
        return Ok(Redirect::to(EPIC_LOGIN_URL.as_str()).into_response());
    };

    match auth.complete_two_factor_login(&cookies, &form.code).await {
        Ok((headers, redirect_to)) => Ok((headers, Redirect::to(&redirect_to)).into_response()),
        Err(e @ CoordinationError::InvalidTwoFactorCode) => {
            let page = render(&LoginTwoFactorTemplate {
                nav: None,
                error: e.public_message(),
            })?;
            Ok((status_for(&e), page).into_response())
        }
        Err(CoordinationError::Unauthenticated | CoordinationError::SessionExpired) => {
            Ok(Redirect::to(EPIC_LOGIN_URL.as_str()).into_response())
        }
        Err(e) => Err((status_for(&e), e.public_message())),
    }
}
