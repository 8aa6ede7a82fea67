use http::HeaderMap;
use std::fmt;

use crate::userdb::{User, UserSearchField, hash_password};

use super::auth::Auth;
use super::errors::CoordinationError;
use super::login::run_blocking;
use super::validation::{check_email, check_name, check_password, check_username};

/// Signup form input
#[derive(Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub name: String,
    pub password: String,
    pub remember: bool,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("name", &self.name)
            .field("password", &"[redacted]")
            .field("remember", &self.remember)
            .finish()
    }
}

impl NewUser {
    fn validate(&self) -> Result<(), CoordinationError> {
        let mut errors = Vec::new();
        check_email(&self.email, &mut errors);
        check_username(&self.username, &mut errors);
        check_name(&self.name, &mut errors);
        check_password(&self.password, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoordinationError::Validation(errors).log())
        }
    }
}

impl Auth {
    /// Create an account and log it in.
    ///
    /// Returns the stored user and headers setting the session cookie.
    #[tracing::instrument(skip(self, new_user), fields(username = %new_user.username))]
    pub async fn signup(&self, new_user: NewUser) -> Result<(User, HeaderMap), CoordinationError> {
        new_user.validate()?;

        let user = User::new(&new_user.email, &new_user.username, &new_user.name);

        if self
            .users()
            .get_user_by(UserSearchField::Email(user.email.clone()))
            .await?
            .is_some()
        {
            return Err(CoordinationError::Conflict(
                "A user already exists with this email".to_string(),
            )
            .log());
        }
        if self
            .users()
            .get_user_by(UserSearchField::Username(user.username.clone()))
            .await?
            .is_some()
        {
            return Err(CoordinationError::Conflict(
                "A user already exists with this username".to_string(),
            )
            .log());
        }

        let password = new_user.password;
        let hash = run_blocking(move || hash_password(&password)).await??;

        let user = self.users().insert_user_with_password(&user, &hash).await?;
        let headers = self.issue_session(&user.id, new_user.remember).await?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok((user, headers))
    }
}
