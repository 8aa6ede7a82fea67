use crate::storage::DataStore;
use crate::userdb::{
    errors::UserError,
    types::{User, UserSearchField},
};

use super::postgres::*;
use super::sqlite::*;

/// Users and their password hashes
#[derive(Clone, Debug)]
pub struct UserStore {
    store: DataStore,
}

impl UserStore {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Create the users and passwords tables if needed and check their layout
    pub async fn init(&self) -> Result<(), UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            create_tables_sqlite(pool).await?;
            validate_user_tables_sqlite(pool).await
        } else if let Some(pool) = self.store.as_postgres() {
            create_tables_postgres(pool).await?;
            validate_user_tables_postgres(pool).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Get a user by their ID
    #[tracing::instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, UserError> {
        self.get_user_by(UserSearchField::Id(id.to_string())).await
    }

    #[tracing::instrument(skip(self), fields(user_field = %field))]
    pub async fn get_user_by(&self, field: UserSearchField) -> Result<Option<User>, UserError> {
        let field = match field {
            UserSearchField::Email(email) => UserSearchField::Email(email.trim().to_lowercase()),
            UserSearchField::Username(name) => {
                UserSearchField::Username(name.trim().to_lowercase())
            }
            id => id,
        };

        let result = if let Some(pool) = self.store.as_sqlite() {
            get_user_by_field_sqlite(pool, &field).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_user_by_field_postgres(pool, &field).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(Some(_)) => tracing::debug!(found = true, "User lookup completed"),
            Ok(None) => tracing::debug!(found = false, "User lookup completed - not found"),
            Err(e) => tracing::error!(error = %e, "User lookup failed"),
        }

        result
    }

    /// Insert a user and their password hash in one transaction.
    ///
    /// A taken email or username yields [`UserError::Conflict`] and leaves no rows behind.
    #[tracing::instrument(skip(self, user, password_hash), fields(user_id = %user.id))]
    pub async fn insert_user_with_password(
        &self,
        user: &User,
        password_hash: &str,
    ) -> Result<User, UserError> {
        let result = if let Some(pool) = self.store.as_sqlite() {
            insert_user_with_password_sqlite(pool, user, password_hash).await
        } else if let Some(pool) = self.store.as_postgres() {
            insert_user_with_password_postgres(pool, user, password_hash).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(user) => tracing::info!(
                user_id = %user.id,
                sequence_number = user.sequence_number,
                "User created"
            ),
            Err(e) => tracing::error!(error = %e, "User creation failed"),
        }

        result
    }

    /// Stored Argon2 PHC string for the user, if any
    pub async fn get_password_hash(&self, user_id: &str) -> Result<Option<String>, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            get_password_hash_sqlite(pool, user_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_password_hash_postgres(pool, user_id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Update email, username and display name
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn update_user(&self, user: &User) -> Result<User, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            update_user_sqlite(pool, user).await
        } else if let Some(pool) = self.store.as_postgres() {
            update_user_postgres(pool, user).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Delete the user; password, sessions and 2FA rows go with it
    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<(), UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            delete_user_sqlite(pool, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            delete_user_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }
}
