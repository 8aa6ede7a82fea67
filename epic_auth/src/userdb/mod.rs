mod errors;
mod password;
mod storage;
mod types;

pub use errors::UserError;
pub use password::hash_password;
pub(crate) use password::{verify_dummy_password, verify_password};
pub(crate) use storage::DB_TABLE_USERS;
pub use storage::UserStore;
pub use types::{User, UserSearchField};
