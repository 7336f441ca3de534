//! Token claim decoding and local expiry checks.
//!
//! The backend issues JWTs; the client only needs the embedded claims
//! (subject identity and expiry instant) and never verifies the signature.
//! Verification is the server's job; a forged token buys the holder
//! nothing locally.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::DecodeError;

use super::tokens::AccessToken;

/// Claims embedded in an access token.
///
/// `exp` and `iat` are seconds since the Unix epoch, matching the
/// issuer's encoding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claims {
    /// Subject identity.
    pub user_id: u64,
    /// Expiry instant, seconds since epoch.
    pub exp: i64,
    /// Issuance instant, seconds since epoch.
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Claims {
    /// Decode the claims embedded in an access token.
    ///
    /// Pure function: no network or storage access. The payload segment is
    /// base64url-decoded and parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the token is malformed or unparseable.
    /// Callers must treat failure as "not authenticated".
    pub fn decode(token: &AccessToken) -> Result<Self, DecodeError> {
        let mut segments = token.as_str().split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(DecodeError::Malformed);
        };

        let bytes = URL_SAFE_NO_PAD.decode(payload)?;
        let claims = serde_json::from_slice(&bytes)?;
        Ok(claims)
    }

    /// Returns the expiry instant of these claims.
    pub fn expires_at(&self) -> DateTime<Utc> {
        // Out-of-range exp values collapse to the epoch, i.e. expired
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Returns true if the token's expiry instant is at or before `now`.
///
/// Also returns true when the token cannot be decoded: an undecodable
/// token must never be treated as valid.
pub fn is_expired(token: &AccessToken, now: DateTime<Utc>) -> bool {
    match Claims::decode(token) {
        Ok(claims) => claims.expires_at() <= now,
        Err(_) => true,
    }
}
