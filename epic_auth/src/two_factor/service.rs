use chrono::{DateTime, Utc};

use super::errors::TwoFactorError;
use super::store::TwoFactorStore;
use super::totp;
use super::types::{Provisioning, TotpParams, TwoFactorSecret, TwoFactorState};
use super::uri::provisioning_uri;

/// Per-user TOTP lifecycle on top of [`TwoFactorStore`]
#[derive(Clone, Debug)]
pub struct TwoFactorService {
    store: TwoFactorStore,
    issuer: String,
    params: TotpParams,
    skew: u8,
}

impl TwoFactorService {
    pub fn new(store: TwoFactorStore, issuer: String, params: TotpParams, skew: u8) -> Self {
        Self {
            store,
            issuer,
            params,
            skew,
        }
    }

    pub async fn init(&self) -> Result<(), TwoFactorError> {
        self.store.init().await
    }

    pub async fn state(&self, user_id: &str) -> Result<TwoFactorState, TwoFactorError> {
        Ok(self
            .store
            .get(user_id)
            .await?
            .map_or(TwoFactorState::Disabled, |secret| secret.state()))
    }

    /// Generate and store a new unconfirmed secret.
    ///
    /// Any earlier unconfirmed secret is discarded. Already enabled users get
    /// [`TwoFactorError::AlreadyEnabled`].
    /// `account` labels the entry in the authenticator app, usually the email.
    #[tracing::instrument(skip(self, account))]
    pub async fn begin_enable(
        &self,
        user_id: &str,
        account: &str,
    ) -> Result<Provisioning, TwoFactorError> {
        let secret = totp::encode_secret(&totp::generate_secret()?);
        let row = TwoFactorSecret {
            user_id: user_id.to_string(),
            secret,
            algorithm: self.params.algorithm.to_string(),
            digits: i64::try_from(self.params.digits)
                .map_err(|_| TwoFactorError::InvalidSecret("digits".to_string()))?,
            period: i64::try_from(self.params.period.max(1))
                .map_err(|_| TwoFactorError::InvalidSecret("period".to_string()))?,
            confirmed_at: None,
            last_used_step: None,
            created_at: Utc::now(),
        };

        if !self.store.upsert_pending(&row).await? {
            return Err(TwoFactorError::AlreadyEnabled);
        }
        tracing::info!("Two-factor setup started");

        self.provisioning_for(account, &row)
    }

    /// Provisioning details of the secret awaiting confirmation
    pub async fn pending_provisioning(
        &self,
        user_id: &str,
        account: &str,
    ) -> Result<Provisioning, TwoFactorError> {
        match self.store.get(user_id).await? {
            Some(row) if row.confirmed_at.is_none() => self.provisioning_for(account, &row),
            _ => Err(TwoFactorError::NotPending),
        }
    }

    /// Turn a pending secret into an enabled one if `code` is valid now
    #[tracing::instrument(skip(self, code))]
    pub async fn confirm(
        &self,
        user_id: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), TwoFactorError> {
        let row = match self.store.get(user_id).await? {
            Some(row) if row.confirmed_at.is_none() => row,
            Some(_) => return Err(TwoFactorError::AlreadyEnabled),
            None => return Err(TwoFactorError::NotPending),
        };

        let step = self.matching_step(&row, code, now)?;
        if !self.store.confirm(user_id, step, now).await? {
            return Err(TwoFactorError::NotPending);
        }

        tracing::info!("Two-factor authentication enabled");
        Ok(())
    }

    /// Check a login code for an enabled user and consume its time step
    #[tracing::instrument(skip(self, code))]
    pub async fn verify_login(
        &self,
        user_id: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), TwoFactorError> {
        let row = match self.store.get(user_id).await? {
            Some(row) if row.confirmed_at.is_some() => row,
            _ => return Err(TwoFactorError::NotEnabled),
        };

        let step = self.matching_step(&row, code, now)?;
        if !self.store.record_used_step(user_id, step).await? {
            tracing::warn!(step, "Rejected reused two-factor code");
            return Err(TwoFactorError::InvalidCode);
        }

        Ok(())
    }

    /// Remove the user's secret, whatever its state
    #[tracing::instrument(skip(self))]
    pub async fn disable(&self, user_id: &str) -> Result<(), TwoFactorError> {
        if self.store.delete(user_id).await? {
            tracing::info!("Two-factor authentication disabled");
        }
        Ok(())
    }

    fn matching_step(
        &self,
        row: &TwoFactorSecret,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, TwoFactorError> {
        let secret = totp::decode_secret(&row.secret)?;
        let params = row.params()?;
        let unix_time = u64::try_from(now.timestamp()).map_err(|_| TwoFactorError::InvalidCode)?;

        totp::matching_step(&secret, &params, code, unix_time, self.skew)
            .ok_or(TwoFactorError::InvalidCode)
    }

    fn provisioning_for(
        &self,
        account: &str,
        row: &TwoFactorSecret,
    ) -> Result<Provisioning, TwoFactorError> {
        let params = row.params()?;
        Ok(Provisioning {
            uri: provisioning_uri(&self.issuer, account, &row.secret, &params),
            secret: row.secret.clone(),
        })
    }
}
