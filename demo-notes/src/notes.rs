use askama::Template;
use axum::{
    Extension, Form, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use epic_auth_axum::{Auth, AuthUser, is_authenticated_or_redirect};

/// Notes kept in memory, keyed by user id
#[derive(Clone, Default)]
pub(crate) struct NoteBoard(Arc<RwLock<HashMap<String, Vec<String>>>>);

impl NoteBoard {
    fn list(&self, user_id: &str) -> Vec<String> {
        self.0
            .read()
            .map(|notes| notes.get(user_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn add(&self, user_id: &str, note: String) {
        if let Ok(mut notes) = self.0.write() {
            notes.entry(user_id.to_string()).or_default().push(note);
        }
    }
}

pub(crate) fn router(auth: Auth) -> Router<Auth> {
    let own_notes = Router::new()
        .route("/notes", get(own_notes))
        .route_layer(from_fn_with_state(auth, is_authenticated_or_redirect));

    Router::new()
        .route("/users/{username}/notes", get(notes).post(add_note))
        .merge(own_notes)
        .layer(Extension(NoteBoard::default()))
}

fn notes_path(username: &str) -> String {
    format!("/users/{}/notes", urlencoding::encode(username))
}

#[derive(Template)]
#[template(path = "notes.j2", escape = "html")]
struct NotesTemplate {
    name: String,
    username: String,
    notes: Vec<String>,
    is_owner: bool,
}

/// `/notes` is a shortcut to the visitor's own notes
async fn own_notes(Extension(user): Extension<AuthUser>) -> Redirect {
    Redirect::to(&notes_path(&user.username))
}

/// Anyone may read a user's notes; only the owner gets the form.
async fn notes(
    State(auth): State<Auth>,
    Path(username): Path<String>,
    viewer: Option<AuthUser>,
    Extension(board): Extension<NoteBoard>,
) -> Result<Response, (StatusCode, String)> {
    let owner = auth.user_by_username(&username).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to look up notes owner");
        (StatusCode::INTERNAL_SERVER_ERROR, e.public_message())
    })?;
    let Some(owner) = owner else {
        return Err((StatusCode::NOT_FOUND, "User not found".to_string()));
    };

    let template = NotesTemplate {
        notes: board.list(&owner.id),
        is_owner: viewer.is_some_and(|v| v.id == owner.id),
        name: owner.name,
        username: owner.username,
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

#[derive(Deserialize)]
struct NoteForm {
    content: String,
}

async fn add_note(
    Path(username): Path<String>,
    user: AuthUser,
    Extension(board): Extension<NoteBoard>,
    Form(form): Form<NoteForm>,
) -> Result<Redirect, (StatusCode, String)> {
    if !user.username.eq_ignore_ascii_case(&username) {
        return Err((StatusCode::FORBIDDEN, "Forbidden".to_string()));
    }
    let content = form.content.trim();
    if !content.is_empty() {
        tracing::debug!(user_id = %user.id, "Note added");
        board.add(&user.id, content.to_string());
    }
    Ok(Redirect::to(&notes_path(&user.username)))
}
