use anyhow::Result;
use clap::Parser;

use super::types::{NewProject, Project};
use super::utils::create_mutation;
use crate::config::EXEC_NAME;
use crate::query::deps::project_key;
use crate::state::State;
use crate::utils::{ask, non_empty};

#[derive(Debug, Parser, Default)]
#[clap(about = "Create a new project")]
pub struct Options {
    #[clap(short = 'n', long = "name", help = "Name of the project")]
    pub name: Option<String>,
    #[clap(short = 'd', long = "description", help = "What the app does")]
    pub description: Option<String>,
    #[clap(long = "prompt", help = "Prompt the app is generated from")]
    pub prompt: Option<String>,
    #[clap(long = "framework", help = "Target framework, e.g. `React Native`")]
    pub framework: Option<String>,
}

/// Asks for whatever `options` leaves out and writes the project.
pub async fn create_project_from(options: Options, state: &State) -> Result<Project> {
    let user = state.user()?;

    let name = ask("Name", options.name, None, true)?;
    let description = non_empty(ask("Description", options.description, None, false)?);

    let project = create_mutation(&state.cache, state.remote())
        .on_success(|project: &Project| {
            log::info!(
                "Project `{}` ({}) has been successfully created",
                project.name,
                project.id
            );
        })
        .mutate(NewProject {
            user_id: user.id.clone(),
            name,
            description,
            prompt: options.prompt.and_then(non_empty),
            framework: options.framework.and_then(non_empty),
        })
        .await?;

    // the detail view of a new project needs no round trip
    state
        .cache
        .set(project_key(project.id), Some(project.clone()));

    Ok(project)
}

pub async fn handle(options: Options, state: &State) -> Result<()> {
    let project = create_project_from(options, state).await?;

    log::info!(
        "See it with `{EXEC_NAME} projects info {}`",
        project.id
    );

    Ok(())
}
