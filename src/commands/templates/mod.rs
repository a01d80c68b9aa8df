pub mod types;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use self::types::{find_template, TEMPLATES};
use crate::commands::projects::types::Project;
use crate::commands::projects::{create_project_from, CreateOptions};
use crate::config::EXEC_NAME;
use crate::state::State;
use crate::views::templates::render;

#[derive(Debug, Parser)]
#[clap(about = "List the built-in templates")]
pub struct ListOptions {}

#[derive(Debug, Parser)]
#[clap(about = "Start a new project from a template")]
pub struct UseOptions {
    #[clap(name = "title", help = "Title of the template, e.g. `Recipe Book`")]
    pub title: String,
    #[clap(
        short = 'n',
        long = "name",
        help = "Name of the project, defaults to the template title"
    )]
    pub name: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[clap(name = "ls", alias = "list")]
    List(ListOptions),
    Use(UseOptions),
}

#[derive(Debug, Parser)]
#[clap(about = "Start projects from pre-built templates")]
pub struct Options {
    #[clap(subcommand)]
    pub commands: Commands,
}

/// Creates a project prefilled from the template titled `title`.
pub async fn use_template(state: &State, title: &str, name: Option<String>) -> Result<Project> {
    let template = find_template(title).ok_or_else(|| {
        anyhow!(
            "No template named `{title}`. Run `{EXEC_NAME} templates ls` to see them all."
        )
    })?;

    create_project_from(
        CreateOptions {
            name: Some(name.unwrap_or_else(|| template.title.to_string())),
            description: Some(template.description.to_string()),
            prompt: Some(format!("{}: {}", template.title, template.description)),
            framework: None,
        },
        state,
    )
    .await
}

pub async fn handle(options: Options, state: &State) -> Result<()> {
    match options.commands {
        Commands::List(_) => println!("{}", render(&TEMPLATES)?),

        Commands::Use(options) => {
            let project = use_template(state, &options.title, options.name).await?;

            log::info!(
                "See it with `{EXEC_NAME} projects info {}`",
                project.id
            );
        }
    }

    Ok(())
}
