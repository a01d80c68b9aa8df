use anyhow::Result;
use clap::Parser;

use super::utils::project_query;
use crate::state::State;
use crate::views::projects::detail;

#[derive(Debug, Parser)]
#[clap(about = "Get information about a project")]
pub struct Options {
    #[clap(name = "project", help = "ID of the project")]
    pub project: i64,
}

pub async fn handle(options: Options, state: &State) -> Result<()> {
    let project = project_query(&state.cache, state.remote(), options.project).await;

    println!("{}", detail(&project));

    Ok(())
}
