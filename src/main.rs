#![warn(clippy::pedantic)]

use anyhow::Result;
use appdeck::commands::handle_command;
use appdeck::config::TOKEN_ENV;
use appdeck::state::{State, StateOptions};
use appdeck::{utils, CLI};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // setup panic hook
    utils::set_hook();

    let cli = CLI::parse();

    utils::logs(cli.verbose);

    let mut state = match State::new(StateOptions {
        override_token: std::env::var(TOKEN_ENV).ok(),
        ..Default::default()
    })
    .await
    {
        Ok(state) => state,
        Err(error) => {
            log::error!("Failed to load local state: {error:#}");
            std::process::exit(1);
        }
    };

    let result = handle_command(cli.commands, &mut state).await;

    state.shutdown();

    if let Err(error) = result {
        log::error!("{error}");
        std::process::exit(1);
    }

    Ok(())
}
