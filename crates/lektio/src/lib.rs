//! lektio - Course Marketplace API Client
//!
//! This library provides a managed session for the lektio course
//! marketplace API: login, registration, durable token storage, local
//! expiry checks, coalesced token refresh, and bearer-header injection on
//! every authenticated request. All authenticated operations flow through
//! a [`Session`] object.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lektio::{ApiUrl, Config, FileTokenStore, Session};
//!
//! # async fn example() -> Result<(), lektio::Error> {
//! let config = Config::new(ApiUrl::new("https://api.lektio.app")?);
//! let store = Arc::new(FileTokenStore::new("/tmp/lektio-tokens.json"));
//! let session = Session::new(config, store);
//!
//! session.bootstrap().await;
//! if !session.state().snapshot().is_authenticated() {
//!     session.login("alice@example.com", "password").await?;
//! }
//!
//! for enrollment in session.enrolled_courses().await? {
//!     println!("{}", enrollment.course.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{
    Claims, FileTokenStore, Identity, MemoryTokenStore, Session, SessionSnapshot, SessionState,
    TokenPair, TokenStore,
};
pub use config::Config;
pub use error::{ApiError, AuthError, DecodeError, Error};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
