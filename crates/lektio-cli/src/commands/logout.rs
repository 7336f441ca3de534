//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use lektio::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(session: &Session, _args: LogoutArgs) -> Result<()> {
    session.logout();
    output::success("Logged out");
    Ok(())
}
