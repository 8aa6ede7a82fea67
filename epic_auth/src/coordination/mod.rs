//! Authentication orchestration
//!
//! High-level operations that combine the user store, sessions and the second
//! factor. Everything hangs off [`Auth`], which request handlers share as state.
//!
//! - `signup`: account creation
//! - `login`: password step, second-factor step, session issuance
//! - `logout`: session teardown
//! - `user`: profile lookups and edits, housekeeping

mod auth;
mod errors;
mod login;
mod logout;
mod signup;
mod user;
mod validation;

pub use auth::Auth;
pub use errors::{CoordinationError, FieldError};
pub use login::{LoginOutcome, LoginRequest};
pub use signup::NewUser;
pub use user::ProfileUpdate;
