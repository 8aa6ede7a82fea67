//! Signed cookie values
//!
//! Wire form: `base64url(json) "." base64url(HMAC-SHA256(key, base64url(json)))`.
//! The first key signs; every key verifies, so secrets can be rotated by prepending.

use hmac::{Hmac, Mac};
use serde::{Serialize, de::DeserializeOwned};
use sha2::Sha256;
use std::fmt;

use crate::utils::{base64url_decode, base64url_encode};

use super::errors::SessionError;
use super::types::SessionPayload;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct SessionCodec {
    keys: Vec<HmacSha256>,
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("keys", &self.keys.len())
            .finish()
    }
}

impl SessionCodec {
    /// Build a codec from signing secrets. Empty secrets are ignored; at least one must remain.
    pub fn new<S: AsRef<str>>(secrets: impl IntoIterator<Item = S>) -> Result<Self, SessionError> {
        let keys = secrets
            .into_iter()
            .filter(|s| !s.as_ref().is_empty())
            .map(|s| {
                HmacSha256::new_from_slice(s.as_ref().as_bytes())
                    .map_err(|e| SessionError::Crypto(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if keys.is_empty() {
            return Err(SessionError::Crypto(
                "At least one session secret is required".to_string(),
            ));
        }

        Ok(Self { keys })
    }

    /// Cookie value naming `session_id`
    pub fn encode(&self, session_id: &str) -> Result<String, SessionError> {
        self.sign(&SessionPayload {
            session_id: session_id.to_string(),
        })
    }

    /// Session id from a cookie value; anything not produced by [`encode`](Self::encode)
    /// under one of our keys is [`SessionError::InvalidCookie`].
    pub fn decode(&self, cookie_value: &str) -> Result<String, SessionError> {
        let payload: SessionPayload = self.unsign(cookie_value)?;
        Ok(payload.session_id)
    }

    pub fn sign<T: Serialize>(&self, payload: &T) -> Result<String, SessionError> {
        let json = serde_json::to_vec(payload).map_err(|e| SessionError::Cookie(e.to_string()))?;
        let body = base64url_encode(&json);

        let mut mac = self
            .keys
            .first()
            .ok_or_else(|| SessionError::Crypto("No signing key".to_string()))?
            .clone();
        mac.update(body.as_bytes());
        let tag = mac.finalize().into_bytes();

        Ok(format!("{body}.{}", base64url_encode(&tag)))
    }

    pub fn unsign<T: DeserializeOwned>(&self, value: &str) -> Result<T, SessionError> {
        let (body, tag) = value.split_once('.').ok_or(SessionError::InvalidCookie)?;
        let tag = base64url_decode(tag).map_err(|_| SessionError::InvalidCookie)?;

        let verified = self.keys.iter().any(|key| {
            let mut mac = key.clone();
            mac.update(body.as_bytes());
            mac.verify_slice(&tag).is_ok()
        });
        if !verified {
            return Err(SessionError::InvalidCookie);
        }

        let json = base64url_decode(body).map_err(|_| SessionError::InvalidCookie)?;
        serde_json::from_slice(&json).map_err(|_| SessionError::InvalidCookie)
    }
}
