use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use epic_auth::Auth;

use crate::error::IntoResponseError;
use crate::session::AuthUser;

use super::{Nav, nav_for, render};

#[derive(Template)]
#[template(path = "user_profile.j2", escape = "html")]
struct UserProfileTemplate {
    nav: Option<Nav>,
    name: String,
    username: String,
    joined: String,
    is_self: bool,
}

#[derive(Template)]
#[template(path = "user_not_found.j2", escape = "html")]
struct UserNotFoundTemplate {
    nav: Option<Nav>,
    username: String,
}

/// Public profile. Edit and logout controls only appear for the owner.
pub(super) async fn user_profile(
    State(auth): State<Auth>,
    Path(username): Path<String>,
    viewer: Option<AuthUser>,
) -> Result<Response, (StatusCode, String)> {
    let nav = nav_for(viewer.as_ref());

    let Some(user) = auth.user_by_username(&username).await.into_response_error()? else {
        let page = render(&UserNotFoundTemplate { nav, username })?;
        return Ok((StatusCode::NOT_FOUND, page).into_response());
    };

    let is_self = viewer.as_ref().is_some_and(|v| v.id == user.id);
    let page = render(&UserProfileTemplate {
        nav,
        joined: user.created_at.format("%B %-d, %Y").to_string(),
        name: user.name,
        username: user.username,
        is_self,
    })?;
    Ok(page.into_response())
}
