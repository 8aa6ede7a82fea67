use askama::Template;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use epic_auth::{Auth, CoordinationError, ProfileUpdate, TwoFactorState};

use crate::error::{IntoResponseError, status_for};
use crate::session::AuthUser;

use super::{Nav, PROFILE_SETTINGS_PATH, render};

#[derive(Default, Deserialize)]
#[serde(default)]
pub(super) struct ProfileForm {
    username: String,
    name: String,
}

#[derive(Template)]
#[template(path = "settings_profile.j2", escape = "html")]
struct ProfileSettingsTemplate {
    nav: Option<Nav>,
    email: String,
    username: String,
    name: String,
    two_factor_enabled: bool,
    errors: Vec<String>,
}

async fn two_factor_enabled(auth: &Auth, user_id: &str) -> Result<bool, (StatusCode, String)> {
    let state = auth
        .two_factor()
        .state(user_id)
        .await
        .map_err(CoordinationError::from)
        .into_response_error()?;
    Ok(state == TwoFactorState::Enabled)
}

pub(super) async fn profile_page(
    State(auth): State<Auth>,
    user: AuthUser,
) -> Result<Response, (StatusCode, String)> {
    let page = render(&ProfileSettingsTemplate {
        nav: Some(Nav::from(&user)),
        two_factor_enabled: two_factor_enabled(&auth, &user.id).await?,
        email: user.email,
        username: user.username,
        name: user.name,
        errors: Vec::new(),
    })?;
    Ok(page.into_response())
}

pub(super) async fn update_profile(
    State(auth): State<Auth>,
    user: AuthUser,
    Form(form): Form<ProfileForm>,
) -> Result<Response, (StatusCode, String)> {
    let update = ProfileUpdate {
        username: form.username.clone(),
        name: form.name.clone(),
    };

    let (status, errors) = match auth.update_profile(&user.id, update).await {
        Ok(updated) => {
            tracing::debug!(user_id = %updated.id, "Profile updated");
            return Ok(Redirect::to(PROFILE_SETTINGS_PATH).into_response());
        }
        Err(CoordinationError::Validation(fields)) => (
            StatusCode::BAD_REQUEST,
            fields.into_iter().map(|f| f.message).collect(),
        ),
        Err(e @ CoordinationError::Conflict(_)) => (status_for(&e), vec![e.public_message()]),
        Err(e) => return Err((status_for(&e), e.public_message())),
    };

    let page = render(&ProfileSettingsTemplate {
        nav: Some(Nav::from(&user)),
        two_factor_enabled: two_factor_enabled(&auth, &user.id).await?,
        email: user.email,
        username: form.username,
        name: form.name,
        errors,
    })?;
    Ok((status, page).into_response())
}

pub(super) async fn logout_other_sessions(
    State(auth): State<Auth>,
    user: AuthUser,
) -> Result<Response, (StatusCode, String)> {
    let session = user.to_authenticated_session();
    auth.logout_other_sessions(&session)
        .await
        .into_response_error()?;
    Ok(Redirect::to(PROFILE_SETTINGS_PATH).into_response())
}
