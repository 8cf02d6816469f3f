//! Session subcommand implementations.

mod login;
mod logout;
mod refresh;
mod request;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::Settings;

#[derive(Args, Debug)]
pub struct SessionCommand {
    #[command(subcommand)]
    pub command: SessionSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionSubcommand {
    /// Log in and persist the session
    Login(login::LoginArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens now
    Refresh(refresh::RefreshArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),

    /// Send an authenticated API request
    Request(request::RequestArgs),
}

pub async fn handle(cmd: SessionCommand, settings: &Settings) -> Result<()> {
    match cmd.command {
        SessionSubcommand::Login(args) => login::run(args, settings).await,
        SessionSubcommand::Whoami(args) => whoami::run(args, settings).await,
        SessionSubcommand::Refresh(args) => refresh::run(args, settings).await,
        SessionSubcommand::Logout(args) => logout::run(args, settings).await,
        SessionSubcommand::Request(args) => request::run(args, settings).await,
    }
}
