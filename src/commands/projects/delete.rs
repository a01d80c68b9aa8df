use anyhow::{bail, Context, Result};
use clap::Parser;

use super::utils::{delete_mutation, project_query};
use crate::state::State;
use crate::views::projects::not_found;

static CONFIRM_DELETE_PROJECT_MESSAGE: &str = "I am sure I want to delete the project named ";

#[derive(Debug, Parser)]
#[clap(about = "Delete a project")]
pub struct Options {
    #[clap(name = "project", help = "ID of the project")]
    pub project: i64,
    #[clap(long = "no-confirm", help = "Skip confirmation")]
    pub force: bool,
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

    if !options.force {
        println!(
            "To confirm, input the following message `{}{}`",
            CONFIRM_DELETE_PROJECT_MESSAGE, project.name
        );

        let output = dialoguer::Input::<String>::new()
            .with_prompt("Message")
            .interact_text()
            .context("Failed to confirm deletion")?;

        if output != format!("{}{}", CONFIRM_DELETE_PROJECT_MESSAGE, project.name) {
            bail!("Aborted deletion of `{}`", project.name);
        }
    }

    delete_mutation(&state.cache, state.remote(), &user.id)
        .mutate(project.id)
        .await?;

    log::info!("Project `{}` ({}) deleted", project.name, project.id);

    Ok(())
}
