pub mod analytics;
pub mod auth;
pub mod completions;
pub mod generate;
pub mod open;
pub mod projects;
pub mod settings;
pub mod templates;
pub mod theme;
pub mod whoami;

use anyhow::Result;
use clap::Subcommand;

use crate::state::State;

#[derive(Debug, Subcommand)]
pub enum Commands {
    Auth(auth::Options),
    Whoami(whoami::Options),
    Projects(projects::Options),
    Generate(generate::Options),
    Analytics(analytics::Options),
    Templates(templates::Options),
    Settings(settings::Options),
    Theme(theme::Options),
    Open(open::Options),
    Completions(completions::Options),
}

pub async fn handle_command(command: Commands, state: &mut State) -> Result<()> {
    match command {
        Commands::Auth(options) => auth::handle(options, state).await,
        Commands::Theme(options) => theme::handle(options, state).await,
        // guarded per route
        Commands::Open(options) => open::handle(options, state).await,
        Commands::Completions(options) => {
            completions::handle(&options);
            Ok(())
        }

        authorized_command => {
            // login so these commands can run
            state.login().await?;

            match authorized_command {
                Commands::Auth(_)
                | Commands::Theme(_)
                | Commands::Open(_)
                | Commands::Completions(_) => unreachable!(),
                Commands::Whoami(options) => whoami::handle(&options, state),
                Commands::Projects(options) => projects::handle(options, state).await,
                Commands::Generate(options) => generate::handle(options, state).await,
                Commands::Analytics(options) => analytics::handle(options, state).await,
                Commands::Templates(options) => templates::handle(options, state).await,
                Commands::Settings(options) => settings::handle(options, state).await,
            }
        }
    }
}
