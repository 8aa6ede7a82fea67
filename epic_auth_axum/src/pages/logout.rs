use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{TypedHeader, headers};

use epic_auth::Auth;

use crate::config::EPIC_REDIRECT_ANON;
use crate::error::IntoResponseError;

/// Destroys the session and clears the cookies, then goes home
pub(super) async fn logout(
    State(auth): State<Auth>,
    cookies: Option<TypedHeader<headers::Cookie>>,
) -> Result<Response, (StatusCode, String)> {
    let redirect = Redirect::to(EPIC_REDIRECT_ANON.as_str());
    match cookies {
        Some(TypedHeader(cookies)) => {
            let headers = auth.logout(&cookies).await.into_response_error()?;
            Ok((headers, redirect).into_response())
        }
        None => Ok(redirect.into_response()),
    }
}
