//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use lektio::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Full name for the new account
    #[arg(long)]
    pub full_name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Password
    #[arg(long)]
    pub password: String,

    /// Password confirmation
    #[arg(long)]
    pub password2: String,
}

pub async fn run(session: &Session, args: RegisterArgs) -> Result<()> {
    eprintln!("{}", "Registering...".dimmed());

    let identity = session
        .register(&args.full_name, &args.email, &args.password, &args.password2)
        .await
        .context("Failed to register")?;

    output::success("Account created and logged in");
    println!();
    output::field("User", &identity.user_id.to_string());
    if let Some(email) = identity.email.as_deref() {
        output::field("Email", email);
    }

    Ok(())
}
