use anyhow::Result;
use clap::Parser;

use super::utils::{deploy_mutation, project_query, style_status};
use crate::state::State;
use crate::views::projects::not_found;

#[derive(Debug, Parser)]
#[clap(about = "Deploy a project")]
pub struct Options {
    #[clap(name = "project", help = "ID of the project")]
    pub project: i64,
}

pub async fn handle(options: Options, state: &State) -> Result<()> {
    let project = project_query(&state.cache, state.remote(), options.project)
        .await
        .into_result()?;

    let Some(project) = (*project).clone() else {
        println!("{}", not_found());
        return Ok(());
    };

    let deployed = deploy_mutation(&state.cache, state.remote())
        .mutate(project)
        .await?;

    log::info!(
        "Project `{}` is now {}",
        deployed.name,
        style_status(deployed.status)
    );

    Ok(())
}
