use chrono::{DateTime, Utc};

use crate::storage::DataStore;
use crate::two_factor::{errors::TwoFactorError, types::TwoFactorSecret};

use super::postgres::*;
use super::sqlite::*;

/// One TOTP secret row per user
#[derive(Clone, Debug)]
pub struct TwoFactorStore {
    store: DataStore,
}

impl TwoFactorStore {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Create the two-factor table if needed and check its layout.
    /// The users table must already exist.
    pub async fn init(&self) -> Result<(), TwoFactorError> {
        if let Some(pool) = self.store.as_sqlite() {
            create_tables_sqlite(pool).await?;
            validate_two_factor_tables_sqlite(pool).await
        } else if let Some(pool) = self.store.as_postgres() {
            create_tables_postgres(pool).await?;
            validate_two_factor_tables_postgres(pool).await
        } else {
            Err(TwoFactorError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<TwoFactorSecret>, TwoFactorError> {
        if let Some(pool) = self.store.as_sqlite() {
            get_secret_sqlite(pool, user_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_secret_postgres(pool, user_id).await
        } else {
            Err(TwoFactorError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Store an unconfirmed secret, replacing any earlier unconfirmed one.
    ///
    /// Returns false, leaving the row alone, when the user already has a confirmed secret.
    #[tracing::instrument(skip(self, secret), fields(user_id = %secret.user_id))]
    pub async fn upsert_pending(&self, secret: &TwoFactorSecret) -> Result<bool, TwoFactorError> {
        if let Some(pool) = self.store.as_sqlite() {
            upsert_pending_secret_sqlite(pool, secret).await
        } else if let Some(pool) = self.store.as_postgres() {
            upsert_pending_secret_postgres(pool, secret).await
        } else {
            Err(TwoFactorError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Mark a pending secret confirmed, consuming `step`. False if nothing was pending.
    #[tracing::instrument(skip(self))]
    pub async fn confirm(
        &self,
        user_id: &str,
        step: u64,
        now: DateTime<Utc>,
    ) -> Result<bool, TwoFactorError> {
        let step = step_to_db(step)?;
        if let Some(pool) = self.store.as_sqlite() {
            confirm_secret_sqlite(pool, user_id, step, now).await
        } else if let Some(pool) = self.store.as_postgres() {
            confirm_secret_postgres(pool, user_id, step, now).await
        } else {
            Err(TwoFactorError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Consume `step` for a confirmed secret.
    ///
    /// Single conditional update: false when the step (or a later one) was already used,
    /// so two requests racing with the same code cannot both succeed.
    #[tracing::instrument(skip(self))]
    pub async fn record_used_step(&self, user_id: &str, step: u64) -> Result<bool, TwoFactorError> {
        let step = step_to_db(step)?;
        if let Some(pool) = self.store.as_sqlite() {
            record_used_step_sqlite(pool, user_id, step).await
        } else if let Some(pool) = self.store.as_postgres() {
            record_used_step_postgres(pool, user_id, step).await
        } else {
            Err(TwoFactorError::Storage("Unsupported database type".to_string()))
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, user_id: &str) -> Result<bool, TwoFactorError> {
        if let Some(pool) = self.store.as_sqlite() {
            delete_secret_sqlite(pool, user_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            delete_secret_postgres(pool, user_id).await
        } else {
            Err(TwoFactorError::Storage("Unsupported database type".to_string()))
        }
    }
}

fn step_to_db(step: u64) -> Result<i64, TwoFactorError> {
    i64::try_from(step).map_err(|_| TwoFactorError::InvalidCode)
}
