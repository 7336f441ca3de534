//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::courses::CoursesArgs;
use crate::commands::login::LoginArgs;
use crate::commands::logout::LogoutArgs;
use crate::commands::profile::ProfileArgs;
use crate::commands::register::RegisterArgs;
use crate::commands::whoami::WhoamiArgs;

/// Course marketplace CLI.
#[derive(Parser, Debug)]
#[command(name = "lektio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL (overrides LEKTIO_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session tokens
    Login(LoginArgs),
    /// Log out and clear stored tokens
    Logout(LogoutArgs),
    /// Register a new account
    Register(RegisterArgs),
    /// Show the identity of the stored session
    Whoami(WhoamiArgs),
    /// Show the current user's profile
    Profile(ProfileArgs),
    /// List enrolled courses
    Courses(CoursesArgs),
}
