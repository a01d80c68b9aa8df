use anyhow::Result;
use clap::Parser;

use crate::commands::projects::utils::{top_projects_query, user_stats_query};
use crate::config::TOP_PROJECTS_LIMIT;
use crate::state::State;
use crate::views::analytics::render;

#[derive(Debug, Parser)]
#[clap(about = "Show download and deployment stats of your projects")]
pub struct Options {}

pub async fn handle(_options: Options, state: &State) -> Result<()> {
    let user_id = state.session.user().map(|user| user.id.clone());
    let remote = state.remote();

    let (stats, top) = tokio::join!(
        user_stats_query(&state.cache, remote.clone(), user_id.as_deref()),
        top_projects_query(
            &state.cache,
            remote.clone(),
            user_id.as_deref().unwrap_or_default(),
            TOP_PROJECTS_LIMIT
        ),
    );

    println!("{}", render(&stats, &top)?);

    Ok(())
}
