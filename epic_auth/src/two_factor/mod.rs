//! TOTP second factor: code generation and checking, provisioning, and the
//! Disabled → PendingVerification → Enabled state machine.

mod errors;
mod service;
mod store;
pub mod totp;
mod types;
mod uri;

pub use errors::TwoFactorError;
pub use service::TwoFactorService;
pub use store::TwoFactorStore;
pub use types::{Provisioning, TotpAlgorithm, TotpParams, TwoFactorSecret, TwoFactorState};
pub use uri::{ProvisioningUri, parse_provisioning_uri, provisioning_uri};
