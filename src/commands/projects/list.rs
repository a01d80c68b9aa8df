use anyhow::Result;
use clap::Parser;

use super::types::ProjectStatus;
use super::utils::projects_query;
use crate::state::State;
use crate::views::projects::{list, ListFilter};

#[derive(Debug, Parser)]
#[clap(about = "List all your projects")]
pub struct Options {
    #[clap(
        short = 's',
        long = "search",
        help = "Only show projects whose name or description contains this"
    )]
    pub search: Option<String>,
    #[clap(
        long = "status",
        value_enum,
        help = "Only show projects with this status"
    )]
    pub status: Option<ProjectStatus>,
    #[clap(
        short = 'q',
        long = "quiet",
        help = "Only print the IDs of the projects"
    )]
    pub quiet: bool,
}

pub async fn handle(options: Options, state: &State) -> Result<()> {
    let user = state.user()?;
    let projects = projects_query(&state.cache, state.remote(), &user.id).await;

    let rendered = list(
        &projects,
        &ListFilter {
            search: options.search,
            status: options.status,
            quiet: options.quiet,
        },
    )?;

    println!("{rendered}");

    Ok(())
}
