//! Authentication: tokens, claims, storage, observable state, and the
//! session that ties them together.
//!
//! All authenticated operations flow through a [`Session`] object.

mod claims;
mod session;
mod state;
mod store;
mod tokens;

pub use claims::{Claims, is_expired};
pub use session::Session;
pub use state::{Identity, SessionSnapshot, SessionState};
pub use store::{
    ACCESS_HORIZON_DAYS, FileTokenStore, MemoryTokenStore, REFRESH_HORIZON_DAYS, TokenStore,
};
pub use tokens::{AccessToken, RefreshToken, TokenPair};
