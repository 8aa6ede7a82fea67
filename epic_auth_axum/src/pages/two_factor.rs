use askama::Template;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use epic_auth::{Auth, CoordinationError, TwoFactorError, TwoFactorState};

use crate::error::{IntoResponseError, status_for};
use crate::session::AuthUser;

use super::{CodeForm, Nav, TWO_FACTOR_PATH, TWO_FACTOR_VERIFY_PATH, render};

#[derive(Template)]
#[template(path = "two_factor.j2", escape = "html")]
struct TwoFactorTemplate {
    nav: Option<Nav>,
    enabled: bool,
    pending: bool,
}

#[derive(Template)]
#[template(path = "two_factor_verify.j2", escape = "html")]
struct TwoFactorVerifyTemplate {
    nav: Option<Nav>,
    uri: String,
    secret: String,
    error: String,
}

fn internal(e: TwoFactorError) -> (StatusCode, String) {
    let e = CoordinationError::from(e);
    (status_for(&e), e.public_message())
}

pub(super) async fn status_page(
    State(auth): State<Auth>,
    user: AuthUser,
) -> Result<Response, (StatusCode, String)> {
    let state = auth
        .two_factor()
        .state(&user.id)
        .await
        .map_err(CoordinationError::from)
        .into_response_error()?;

    let page = render(&TwoFactorTemplate {
        nav: Some(Nav::from(&user)),
        enabled: state == TwoFactorState::Enabled,
        pending: state == TwoFactorState::PendingVerification,
    })?;
    Ok(page.into_response())
}

/// Generate a fresh secret and move on to the verify page
pub(super) async fn begin_enable(
    State(auth): State<Auth>,
    user: AuthUser,
) -> Result<Response, (StatusCode, String)> {
    match auth.two_factor().begin_enable(&user.id, &user.email).await {
        Ok(_) => Ok(Redirect::to(TWO_FACTOR_VERIFY_PATH).into_response()),
        Err(TwoFactorError::AlreadyEnabled) => Ok(Redirect::to(TWO_FACTOR_PATH).into_response()),
        Err(e) => Err(internal(e)),
    }
}

async fn verify_template(
    auth: &Auth,
    user: &AuthUser,
    error: String,
) -> Result<Option<TwoFactorVerifyTemplate>, (StatusCode, String)> {
    match auth
        .two_factor()
        .pending_provisioning(&user.id, &user.email)
        .await
    {
        Ok(provisioning) => Ok(Some(TwoFactorVerifyTemplate {
            nav: Some(Nav::from(user)),
            uri: provisioning.uri,
            secret: provisioning.secret,
            error,
        })),
        Err(TwoFactorError::NotPending) => Ok(None),
        Err(e) => Err(internal(e)),
    }
}

pub(super) async fn verify_page(
    State(auth): State<Auth>,
    user: AuthUser,
) -> Result<Response, (StatusCode, String)> {
    match verify_template(&auth, &user, String::new()).await? {
        Some(template) => Ok(render(&template)?.into_response()),
        None => Ok(Redirect::to(TWO_FACTOR_PATH).into_response()),
    }
}

pub(super) async fn verify(
    State(auth): State<Auth>,
    user: AuthUser,
    Form(form): Form<CodeForm>,
) -> Result<Response, (StatusCode, String)> {
    match auth
        .two_factor()
        .confirm(&user.id, &form.code, Utc::now())
        .await
    {
        Ok(()) => Ok(Redirect::to(TWO_FACTOR_PATH).into_response()),
        Err(TwoFactorError::InvalidCode) => {
            let error = CoordinationError::InvalidTwoFactorCode;
            match verify_template(&auth, &user, error.public_message()).await? {
                Some(template) => Ok((status_for(&error), render(&template)?).into_response()),
                None => Ok(Redirect::to(TWO_FACTOR_PATH).into_response()),
            }
        }
        Err(TwoFactorError::NotPending | TwoFactorError::AlreadyEnabled) => {
            Ok(Redirect::to(TWO_FACTOR_PATH).into_response())
        }
        Err(e) => Err(internal(e)),
    }
}

pub(super) async fn disable(
    State(auth): State<Auth>,
    user: AuthUser,
) -> Result<Response, (StatusCode, String)> {
    auth.two_factor().disable(&user.id).await.map_err(internal)?;
    Ok(Redirect::to(TWO_FACTOR_PATH).into_response())
}
