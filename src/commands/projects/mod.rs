mod create;
mod delete;
mod deploy;
mod edit;
mod info;
mod list;
pub mod types;
pub mod utils;

pub use create::{create_project_from, Options as CreateOptions};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::state::State;

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[clap(name = "new", alias = "create")]
    Create(create::Options),
    Info(info::Options),
    #[clap(name = "ls", alias = "list")]
    List(list::Options),
    Edit(edit::Options),
    Deploy(deploy::Options),
    #[clap(name = "rm", alias = "delete")]
    Delete(delete::Options),
}

#[derive(Debug, Parser)]
#[clap(about = "Interact with projects")]
pub struct Options {
    #[clap(subcommand)]
    pub commands: Commands,
}

pub async fn handle(options: Options, state: &State) -> Result<()> {
    match options.commands {
        Commands::List(options) => list::handle(options, state).await,
        Commands::Info(options) => info::handle(options, state).await,
        Commands::Create(options) => create::handle(options, state).await,
        Commands::Edit(options) => edit::handle(options, state).await,
        Commands::Deploy(options) => deploy::handle(options, state).await,
        Commands::Delete(options) => delete::handle(options, state).await,
    }
}
