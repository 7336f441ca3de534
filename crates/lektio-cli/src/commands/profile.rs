//! Profile command implementation.

use anyhow::{Context, Result};
use clap::Args;

use lektio::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct ProfileArgs {}

pub async fn run(session: &Session, _args: ProfileArgs) -> Result<()> {
    let profile = session.profile().await.context("Failed to fetch profile")?;

    output::field("Name", &profile.full_name);
    if let Some(email) = profile.email.as_deref() {
        output::field("Email", email);
    }
    if let Some(country) = profile.country.as_deref() {
        output::field("Country", country);
    }
    if let Some(about) = profile.about.as_deref() {
        output::field("About", about);
    }

    Ok(())
}
