//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use lektio::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(session: &Session, args: LoginArgs) -> Result<()> {
    eprintln!("{}", "Logging in...".dimmed());

    let identity = session
        .login(&args.email, &args.password)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("User", &identity.user_id.to_string());
    if let Some(name) = identity.full_name.as_deref() {
        output::field("Name", name);
    }
    if let Some(email) = identity.email.as_deref() {
        output::field("Email", email);
    }

    Ok(())
}
