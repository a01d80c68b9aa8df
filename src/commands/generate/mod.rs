use anyhow::Result;
use clap::Parser;

use crate::commands::projects::types::{NewProject, Project};
use crate::commands::projects::utils::create_mutation;
use crate::config::EXEC_NAME;
use crate::generation::{
    validate_prompt, CannedGenerator, GeneratedArtifact, Generator, SUGGESTIONS,
};
use crate::state::State;
use crate::utils::{ask, truncate};
use crate::views::projects::artifact;

const NAME_LENGTH: usize = 40;

#[derive(Debug, Parser)]
#[clap(about = "Generate an app from a prompt")]
pub struct Options {
    #[clap(name = "prompt", help = "Describe your app idea")]
    pub prompt: Option<String>,
    #[clap(
        short = 'n',
        long = "name",
        help = "Name of the project, defaults to the prompt"
    )]
    pub name: Option<String>,
    #[clap(long = "framework", help = "Target framework, e.g. `React Native`")]
    pub framework: Option<String>,
}

/// Writes the project as in progress, then asks `generator` for the app.
pub async fn generate(
    state: &State,
    generator: &dyn Generator,
    prompt: &str,
    name: Option<String>,
    framework: Option<String>,
) -> Result<(Project, GeneratedArtifact)> {
    let user = state.user()?;
    let prompt = validate_prompt(prompt)?;

    let project = create_mutation(&state.cache, state.remote())
        .mutate(NewProject {
            user_id: user.id.clone(),
            name: name.unwrap_or_else(|| truncate(prompt, NAME_LENGTH)),
            description: None,
            prompt: Some(prompt.to_string()),
            framework,
        })
        .await?;

    log::info!("AI is thinking...");

    let generated = generator.submit(prompt).await?;

    Ok((project, generated))
}

pub async fn handle(options: Options, state: &State) -> Result<()> {
    if options.prompt.is_none() {
        println!("Quick ideas:");

        for suggestion in SUGGESTIONS {
            println!("  {suggestion}");
        }
    }

    let prompt = ask("Describe your app idea", options.prompt, None, true)?;

    let (project, generated) = generate(
        state,
        &CannedGenerator::default(),
        &prompt,
        options.name,
        options.framework,
    )
    .await?;

    println!("{}", artifact(&generated));

    log::info!(
        "Saved as project `{}` ({}). Deploy it with `{EXEC_NAME} projects deploy {}`",
        project.name,
        project.id,
        project.id
    );

    Ok(())
}
