pub mod commands;
pub mod config;
pub mod generation;
pub mod query;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
pub mod views;

use clap::Parser;
use commands::Commands;

#[derive(Debug, Parser)]
#[clap(
    name = "appdeck",
    about = "Build, manage and deploy AI generated apps from your terminal",
    version,
    author
)]
pub struct CLI {
    #[clap(subcommand)]
    pub commands: Commands,

    #[clap(
        short = 'v',
        long = "verbose",
        help = "Print more information",
        global = true
    )]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_cli() {
        use super::*;
        use clap::CommandFactory;

        CLI::command().debug_assert();
    }

    #[test]
    fn test_parse_project_commands() {
        use super::*;

        let cli = CLI::try_parse_from([
            "appdeck",
            "projects",
            "ls",
            "--status",
            "in-progress",
            "-q",
        ])
        .unwrap();

        assert!(matches!(cli.commands, Commands::Projects(_)));
        let bad_id = CLI::try_parse_from(["appdeck", "projects", "info", "abc"]);
        assert!(bad_id.is_err());
    }
}
