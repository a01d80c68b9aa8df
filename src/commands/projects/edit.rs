use anyhow::Result;
use clap::Parser;

use super::types::ProjectChanges;
use super::utils::{project_query, update_mutation};
use crate::state::State;
use crate::utils::{ask, non_empty};
use crate::views::projects::not_found;

#[derive(Debug, Parser)]
#[clap(about = "Edit the name and description of a project")]
pub struct Options {
    #[clap(name = "project", help = "ID of the project")]
    pub project: i64,
    #[clap(short = 'n', long = "name", help = "New name of the project")]
    pub name: Option<String>,
    #[clap(
        short = 'd',
        long = "description",
        help = "New description, empty to clear it"
    )]
    pub description: Option<String>,
}

pub async fn handle(options: Options, state: &State) -> Result<()> {
    let user = state.user()?;

    let project = project_query(&state.cache, state.remote(), options.project)
        .await
        .into_result()?;

    let Some(project) = &*project else {
        println!("{}", not_found());
        return Ok(());
    };

    let prompting = options.name.is_none() && options.description.is_none();

    let name = if prompting {
        ask("Name", None, Some(project.name.as_str()), true)?
    } else {
        let fallback = options.name.or_else(|| Some(project.name.clone()));
        ask("Name", fallback, None, true)?
    };

    let description = if prompting {
        ask("Description", None, project.description.as_deref(), false)?
    } else {
        options
            .description
            .or_else(|| project.description.clone())
            .unwrap_or_default()
    };

    let updated = update_mutation(&state.cache, state.remote(), &user.id)
        .mutate((
            project.id,
            ProjectChanges {
                name,
                description: non_empty(description),
            },
        ))
        .await?;

    log::info!("Project `{}` ({}) updated", updated.name, updated.id);

    Ok(())
}
