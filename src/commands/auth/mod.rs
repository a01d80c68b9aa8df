pub mod login;
mod logout;
pub mod types;
pub mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::state::State;

#[derive(Debug, Subcommand)]
pub enum Commands {
    Login(login::Options),
    Logout(logout::Options),
}

#[derive(Debug, Parser)]
#[clap(about = "Authenticate with your backend")]
pub struct Options {
    #[clap(subcommand)]
    pub commands: Commands,
}

pub async fn handle(options: Options, state: &mut State) -> Result<()> {
    match options.commands {
        Commands::Login(options) => login::handle(options, state).await,
        Commands::Logout(options) => logout::handle(options, state).await,
    }
}
