use url::Url;

use super::errors::TwoFactorError;
use super::totp;
use super::types::{TotpAlgorithm, TotpParams};

/// `otpauth://totp/{issuer}:{account}?secret=…&issuer=…&algorithm=…&digits=…&period=…`
///
/// Parameters are always written out, even defaults, so apps that ignore
/// missing ones still agree with the server.
pub fn provisioning_uri(issuer: &str, account: &str, secret: &str, params: &TotpParams) -> String {
    let issuer = urlencoding::encode(issuer);
    let account = urlencoding::encode(account);
    format!(
        "otpauth://totp/{issuer}:{account}?secret={secret}&issuer={issuer}&algorithm={}&digits={}&period={}",
        params.algorithm, params.digits, params.period
    )
}

/// A parsed provisioning URI
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningUri {
    pub issuer: Option<String>,
    pub account: String,
    /// Base32 secret as it appeared in the URI
    pub secret: String,
    pub params: TotpParams,
}

impl ProvisioningUri {
    pub fn secret_bytes(&self) -> Result<Vec<u8>, TwoFactorError> {
        totp::decode_secret(&self.secret)
    }

    /// Code an authenticator app would show at `unix_time`
    pub fn code_at(&self, unix_time: u64) -> Result<String, TwoFactorError> {
        Ok(totp::generate(&self.secret_bytes()?, &self.params, unix_time))
    }
}

/// Read a `otpauth://totp/...` URI back. Missing parameters take the usual defaults.
pub fn parse_provisioning_uri(uri: &str) -> Result<ProvisioningUri, TwoFactorError> {
    let url = Url::parse(uri).map_err(|e| TwoFactorError::InvalidUri(e.to_string()))?;

    if url.scheme() != "otpauth" {
        return Err(TwoFactorError::InvalidUri(format!(
            "unexpected scheme {}",
            url.scheme()
        )));
    }
    if url.host_str() != Some("totp") {
        return Err(TwoFactorError::InvalidUri(
            "only totp uris are supported".to_string(),
        ));
    }

    let label = url.path().trim_start_matches('/');
    let decode = |s: &str| {
        urlencoding::decode(s)
            .map(|d| d.into_owned())
            .map_err(|e| TwoFactorError::InvalidUri(e.to_string()))
    };
    let (label_issuer, account) = match label.split_once(':') {
        Some((issuer, account)) => (Some(decode(issuer)?), decode(account)?),
        None => (None, decode(label)?),
    };

    let defaults = TotpParams::default();
    let mut secret = None;
    let mut issuer = label_issuer;
    let mut params = defaults;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "secret" => secret = Some(value.into_owned()),
            "issuer" => issuer = Some(value.into_owned()),
            "algorithm" => params.algorithm = value.parse::<TotpAlgorithm>()?,
            "digits" => {
                params.digits = value
                    .parse()
                    .ok()
                    .filter(|d| TotpParams::DIGITS.contains(d))
                    .ok_or_else(|| TwoFactorError::InvalidUri(format!("digits={value}")))?
            }
            "period" => {
                params.period = value
                    .parse()
                    .ok()
                    .filter(|p: &u64| *p > 0)
                    .ok_or_else(|| TwoFactorError::InvalidUri(format!("period={value}")))?
            }
            _ => {}
        }
    }

    let secret =
        secret.ok_or_else(|| TwoFactorError::InvalidUri("missing secret".to_string()))?;

    Ok(ProvisioningUri {
        issuer,
        account,
        secret,
        params,
    })
}
