//! Time-based one-time passwords (RFC 6238)
//!
//! The HOTP computation itself is delegated to `totp-rs`; this module fixes the
//! interface the rest of the crate uses: explicit time, explicit skew, and the
//! matched time step for replay protection.

use subtle::ConstantTimeEq;
use totp_rs::{Secret, TOTP};

use crate::utils::gen_random_bytes;

use super::errors::TwoFactorError;
use super::types::TotpParams;

/// Length of newly generated secrets (160 bits, as RFC 4226 recommends)
pub const SECRET_LEN: usize = 20;

/// Digits outside [`TotpParams::DIGITS`] are clamped so the HOTP truncation
/// cannot overflow; such codes never pass the length check in [`matching_step`].
fn engine(secret: &[u8], params: &TotpParams) -> TOTP {
    let digits = params
        .digits
        .clamp(*TotpParams::DIGITS.start(), *TotpParams::DIGITS.end());
    TOTP::new_unchecked(
        params.algorithm.into(),
        digits,
        0,
        params.period.max(1),
        secret.to_vec(),
        None,
        String::new(),
    )
}

/// Code for the time step containing `unix_time`
pub fn generate(secret: &[u8], params: &TotpParams, unix_time: u64) -> String {
    engine(secret, params).generate(unix_time)
}

/// Whether `code` matches any step within `skew` steps of `unix_time`
pub fn verify(secret: &[u8], params: &TotpParams, code: &str, unix_time: u64, skew: u8) -> bool {
    matching_step(secret, params, code, unix_time, skew).is_some()
}

/// The time step `code` belongs to, searching `skew` steps either side of `unix_time`.
///
/// Codes of the wrong length or with non-digit characters never match.
pub fn matching_step(
    secret: &[u8],
    params: &TotpParams,
    code: &str,
    unix_time: u64,
    skew: u8,
) -> Option<u64> {
    let code = code.trim();
    if code.len() != params.digits || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let period = params.period.max(1);
    let totp = engine(secret, params);
    let current = unix_time / period;
    let skew = u64::from(skew);

    let mut matched = None;
    for step in current.saturating_sub(skew)..=current.saturating_add(skew) {
        let Some(time) = step.checked_mul(period) else {
            continue;
        };
        let candidate = totp.generate(time);
        if bool::from(candidate.as_bytes().ct_eq(code.as_bytes())) && matched.is_none() {
            matched = Some(step);
        }
    }
    matched
}

/// Fresh random secret
pub fn generate_secret() -> Result<Vec<u8>, TwoFactorError> {
    Ok(gen_random_bytes(SECRET_LEN)?)
}

/// Base32 (RFC 4648, unpadded) form used in provisioning URIs
pub fn encode_secret(secret: &[u8]) -> String {
    Secret::Raw(secret.to_vec()).to_encoded().to_string()
}

/// Accepts upper or lower case, spaces and padding, as users tend to type them
pub fn decode_secret(encoded: &str) -> Result<Vec<u8>, TwoFactorError> {
    let normalized: String = encoded
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if normalized.is_empty() {
        return Err(TwoFactorError::InvalidSecret("empty secret".to_string()));
    }

    Secret::Encoded(normalized)
        .to_bytes()
        .map_err(|e| TwoFactorError::InvalidSecret(format!("{e:?}")))
}
