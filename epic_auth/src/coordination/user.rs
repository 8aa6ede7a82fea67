use chrono::Utc;

use crate::userdb::{User, UserSearchField};

use super::auth::Auth;
use super::errors::CoordinationError;
use super::validation::{check_name, check_username};

/// Editable profile fields
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: String,
    pub name: String,
}

impl Auth {
    /// Public profile lookup
    pub async fn user_by_username(&self, username: &str) -> Result<Option<User>, CoordinationError> {
        Ok(self
            .users()
            .get_user_by(UserSearchField::Username(username.to_string()))
            .await?)
    }

    /// Change a user's username and display name
    #[tracing::instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<User, CoordinationError> {
        let mut errors = Vec::new();
        check_username(&update.username, &mut errors);
        check_name(&update.name, &mut errors);
        if !errors.is_empty() {
            return Err(CoordinationError::Validation(errors).log());
        }

        let user = self
            .users()
            .get_user(user_id)
            .await?
            .ok_or(CoordinationError::Unauthenticated)?;

        let username = update.username.trim().to_lowercase();
        if username != user.username
            && self
                .user_by_username(&username)
                .await?
                .is_some()
        {
            return Err(CoordinationError::Conflict(
                "A user already exists with this username".to_string(),
            )
            .log());
        }

        let updated = User {
            username,
            name: update.name.trim().to_string(),
            ..user
        };
        Ok(self.users().update_user(&updated).await?)
    }

    /// Delete session rows past their expiry; returns how many went
    pub async fn prune_expired_sessions(&self) -> Result<u64, CoordinationError> {
        Ok(self.sessions().delete_expired(Utc::now()).await?)
    }
}
