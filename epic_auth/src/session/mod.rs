mod codec;
mod errors;
mod gate;
mod store;
mod types;

pub use codec::SessionCodec;
pub use errors::SessionError;
pub use store::SessionStore;
pub use types::{AuthenticatedSession, PendingLogin, Session, SessionUser};
