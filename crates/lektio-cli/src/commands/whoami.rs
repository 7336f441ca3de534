//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use lektio::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(session: &Session, _args: WhoamiArgs) -> Result<()> {
    // Local decode of the stored token; no network round trip
    let claims = session
        .current_claims()
        .context("No active session. Run 'lektio login' first.")?;

    output::field("User", &claims.user_id.to_string());
    if let Some(name) = claims.full_name.as_deref() {
        output::field("Name", name);
    }
    if let Some(email) = claims.email.as_deref() {
        output::field("Email", email);
    }
    output::field("Expires", &claims.expires_at().to_rfc3339());

    Ok(())
}
