use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::errors::TwoFactorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TotpAlgorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl TotpAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            TotpAlgorithm::Sha1 => "SHA1",
            TotpAlgorithm::Sha256 => "SHA256",
            TotpAlgorithm::Sha512 => "SHA512",
        }
    }
}

impl fmt::Display for TotpAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TotpAlgorithm {
    type Err = TwoFactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA1" => Ok(TotpAlgorithm::Sha1),
            "SHA256" => Ok(TotpAlgorithm::Sha256),
            "SHA512" => Ok(TotpAlgorithm::Sha512),
            other => Err(TwoFactorError::InvalidSecret(format!(
                "Unsupported algorithm: {other}"
            ))),
        }
    }
}

impl From<TotpAlgorithm> for totp_rs::Algorithm {
    fn from(algorithm: TotpAlgorithm) -> Self {
        match algorithm {
            TotpAlgorithm::Sha1 => totp_rs::Algorithm::SHA1,
            TotpAlgorithm::Sha256 => totp_rs::Algorithm::SHA256,
            TotpAlgorithm::Sha512 => totp_rs::Algorithm::SHA512,
        }
    }
}

/// Code parameters shared by the authenticator app and the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotpParams {
    pub algorithm: TotpAlgorithm,
    pub digits: usize,
    /// Step length in seconds
    pub period: u64,
}

impl TotpParams {
    /// Code lengths authenticator apps agree on
    pub const DIGITS: std::ops::RangeInclusive<usize> = 6..=8;

    pub fn has_valid_digits(&self) -> bool {
        Self::DIGITS.contains(&self.digits)
    }
}

impl Default for TotpParams {
    fn default() -> Self {
        Self {
            algorithm: TotpAlgorithm::Sha1,
            digits: 6,
            period: 30,
        }
    }
}

/// A user's stored TOTP secret. `confirmed_at == None` means setup is still pending.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TwoFactorSecret {
    pub user_id: String,
    /// Base32, unpadded
    pub secret: String,
    pub algorithm: String,
    pub digits: i64,
    pub period: i64,
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Last accepted time step; codes at or before it are refused
    pub last_used_step: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TwoFactorSecret {
    pub fn params(&self) -> Result<TotpParams, TwoFactorError> {
        let digits = usize::try_from(self.digits)
            .ok()
            .filter(|d| TotpParams::DIGITS.contains(d))
            .ok_or_else(|| TwoFactorError::InvalidSecret(format!("digits={}", self.digits)))?;
        let period = u64::try_from(self.period)
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| TwoFactorError::InvalidSecret(format!("period={}", self.period)))?;

        Ok(TotpParams {
            algorithm: self.algorithm.parse()?,
            digits,
            period,
        })
    }

    pub fn state(&self) -> TwoFactorState {
        if self.confirmed_at.is_some() {
            TwoFactorState::Enabled
        } else {
            TwoFactorState::PendingVerification
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TwoFactorState {
    Disabled,
    PendingVerification,
    Enabled,
}

/// What an authenticator app needs to start producing codes
#[derive(Debug, Clone, PartialEq)]
pub struct Provisioning {
    /// `otpauth://totp/...` URI, usually shown as a QR code or text
    pub uri: String,
    /// Base32 secret for manual entry
    pub secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_row(algorithm: &str, digits: i64, period: i64) -> TwoFactorSecret {
        TwoFactorSecret {
            user_id: "u1".to_string(),
            secret: "JBSWY3DPEHPK3PXP".to_string(),
            algorithm: algorithm.to_string(),
            digits,
            period,
            confirmed_at: None,
            last_used_step: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_algorithm_parse_and_display() {
        assert_eq!("sha1".parse::<TotpAlgorithm>().ok(), Some(TotpAlgorithm::Sha1));
        assert_eq!(
            "SHA-256".parse::<TotpAlgorithm>().ok(),
            Some(TotpAlgorithm::Sha256)
        );
        assert_eq!(
            "Sha512".parse::<TotpAlgorithm>().ok(),
            Some(TotpAlgorithm::Sha512)
        );
        assert!("md5".parse::<TotpAlgorithm>().is_err());
        assert_eq!(TotpAlgorithm::Sha256.to_string(), "SHA256");
    }

    #[test]
    fn test_default_params() {
        let params = TotpParams::default();
        assert_eq!(params.algorithm, TotpAlgorithm::Sha1);
        assert_eq!(params.digits, 6);
        assert_eq!(params.period, 30);
        assert!(params.has_valid_digits());
        assert!(
            !TotpParams {
                digits: 10,
                ..params
            }
            .has_valid_digits()
        );
    }

    #[test]
    fn test_secret_row_params() {
        let params = secret_row("SHA256", 8, 60).params().expect("params");
        assert_eq!(params.algorithm, TotpAlgorithm::Sha256);
        assert_eq!(params.digits, 8);
        assert_eq!(params.period, 60);

        assert!(secret_row("SHA1", -1, 30).params().is_err());
        assert!(secret_row("SHA1", 12, 30).params().is_err());
        assert!(secret_row("SHA1", 6, 0).params().is_err());
        assert!(secret_row("MD5", 6, 30).params().is_err());
    }

    #[test]
    fn test_secret_row_state() {
        let mut row = secret_row("SHA1", 6, 30);
        assert_eq!(row.state(), TwoFactorState::PendingVerification);
        row.confirmed_at = Some(Utc::now());
        assert_eq!(row.state(), TwoFactorState::Enabled);
    }
}
