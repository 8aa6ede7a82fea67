use chrono::{DateTime, Utc};

use crate::session::{errors::SessionError, types::Session};
use crate::storage::DataStore;

use super::postgres::*;
use super::sqlite::*;

/// Database-backed session rows
#[derive(Clone, Debug)]
pub struct SessionStore {
    store: DataStore,
}

impl SessionStore {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Create the sessions table if needed and check its layout.
    /// The users table must already exist.
    pub async fn init(&self) -> Result<(), SessionError> {
        if let Some(pool) = self.store.as_sqlite() {
            create_tables_sqlite(pool).await?;
            validate_session_tables_sqlite(pool).await
        } else if let Some(pool) = self.store.as_postgres() {
            create_tables_postgres(pool).await?;
            validate_session_tables_postgres(pool).await
        } else {
            Err(SessionError::Storage("Unsupported database type".to_string()))
        }
    }

    #[tracing::instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn insert(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(pool) = self.store.as_sqlite() {
            insert_session_sqlite(pool, session).await
        } else if let Some(pool) = self.store.as_postgres() {
            insert_session_postgres(pool, session).await
        } else {
            Err(SessionError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Look a session up by id. Expired rows are returned; callers check expiry.
    pub async fn get(&self, id: &str) -> Result<Option<Session>, SessionError> {
        if let Some(pool) = self.store.as_sqlite() {
            get_session_sqlite(pool, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_session_postgres(pool, id).await
        } else {
            Err(SessionError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Delete one session. Returns whether a row was removed.
    #[tracing::instrument(skip(self, id))]
    pub async fn delete(&self, id: &str) -> Result<bool, SessionError> {
        let result = if let Some(pool) = self.store.as_sqlite() {
            delete_session_sqlite(pool, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            delete_session_postgres(pool, id).await
        } else {
            Err(SessionError::Storage("Unsupported database type".to_string()))
        };

        if let Ok(deleted) = &result {
            tracing::debug!(deleted, "Session delete completed");
        }
        result
    }

    /// Delete every session of `user_id` except `keep_id`.
    #[tracing::instrument(skip(self, keep_id))]
    pub async fn delete_for_user_except(
        &self,
        user_id: &str,
        keep_id: Option<&str>,
    ) -> Result<u64, SessionError> {
        if let Some(pool) = self.store.as_sqlite() {
            delete_user_sessions_except_sqlite(pool, user_id, keep_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            delete_user_sessions_except_postgres(pool, user_id, keep_id).await
        } else {
            Err(SessionError::Storage("Unsupported database type".to_string()))
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionError> {
        let result = if let Some(pool) = self.store.as_sqlite() {
            delete_expired_sessions_sqlite(pool, now).await
        } else if let Some(pool) = self.store.as_postgres() {
            delete_expired_sessions_postgres(pool, now).await
        } else {
            Err(SessionError::Storage("Unsupported database type".to_string()))
        };

        if let Ok(count) = &result {
            tracing::info!(count, "Expired sessions pruned");
        }
        result
    }

    pub async fn count_for_user(&self, user_id: &str) -> Result<i64, SessionError> {
        if let Some(pool) = self.store.as_sqlite() {
            count_user_sessions_sqlite(pool, user_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            count_user_sessions_postgres(pool, user_id).await
        } else {
            Err(SessionError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Move the expiry of a session that is still live at `now`.
    ///
    /// Returns `false` for missing and already expired sessions.
    pub async fn set_expiry(
        &self,
        id: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, SessionError> {
        if let Some(pool) = self.store.as_sqlite() {
            update_session_expiry_sqlite(pool, id, expires_at, now).await
        } else if let Some(pool) = self.store.as_postgres() {
            update_session_expiry_postgres(pool, id, expires_at, now).await
        } else {
            Err(SessionError::Storage("Unsupported database type".to_string()))
        }
    }
}
