//! Client configuration.

use std::env;

use crate::error::{Error, InvalidInputError};
use crate::types::ApiUrl;

/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "LEKTIO_API_URL";

/// Environment variable holding the payment-provider client identifier.
pub const PAYMENT_CLIENT_ID_VAR: &str = "LEKTIO_PAYMENT_CLIENT_ID";

/// Configuration for a [`Session`](crate::Session).
///
/// The payment client id is an opaque pass-through for checkout widgets;
/// the core never parses it.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the marketplace API.
    pub api_base: ApiUrl,
    /// Payment-provider client identifier, if configured.
    pub payment_client_id: Option<String>,
}

impl Config {
    /// Create a configuration with the given API base URL.
    pub fn new(api_base: ApiUrl) -> Self {
        Self {
            api_base,
            payment_client_id: None,
        }
    }

    /// Set the payment-provider client identifier.
    pub fn with_payment_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.payment_client_id = Some(client_id.into());
        self
    }

    /// Build a configuration from the process environment.
    ///
    /// Reads `LEKTIO_API_URL` (required) and `LEKTIO_PAYMENT_CLIENT_ID`
    /// (optional).
    ///
    /// # Errors
    ///
    /// Returns an error if `LEKTIO_API_URL` is unset or not a valid URL.
    pub fn from_env() -> Result<Self, Error> {
        let raw = env::var(API_URL_VAR).map_err(|_| InvalidInputError::ApiUrl {
            value: String::new(),
            reason: format!("{} is not set", API_URL_VAR),
        })?;

        let api_base = ApiUrl::new(&raw)?;
        let payment_client_id = env::var(PAYMENT_CLIENT_ID_VAR).ok();

        Ok(Self {
            api_base,
            payment_client_id,
        })
    }
}
