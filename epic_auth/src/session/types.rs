use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::userdb::User as DbUser;
use crate::utils::gen_random_string;

use super::errors::SessionError;

/// A server-side login record. The cookie only carries its id.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// New session for `user_id` with a random 32-byte id.
    pub fn new(user_id: &str, ttl: Duration) -> Result<Self, SessionError> {
        let now = Utc::now();
        Ok(Self {
            id: gen_random_string(32)?,
            user_id: user_id.to_string(),
            expires_at: now + ttl,
            created_at: now,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The user as seen by request handlers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<DbUser> for SessionUser {
    fn from(db_user: DbUser) -> Self {
        Self {
            id: db_user.id,
            email: db_user.email,
            username: db_user.username,
            name: db_user.name,
            created_at: db_user.created_at,
        }
    }
}

/// Result of a successful authentication check
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedSession {
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUser,
}

/// Signed proof that the password step passed for a user who still owes a 2FA code.
///
/// Carried in the verification cookie. It grants no access on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLogin {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub remember: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl PendingLogin {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Session cookie payload
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SessionPayload {
    pub(super) session_id: String,
}
