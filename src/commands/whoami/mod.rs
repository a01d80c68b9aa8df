use anyhow::Result;
use clap::Parser;

use crate::state::State;
use crate::utils::urlify;

#[derive(Debug, Parser)]
#[clap(about = "Get information about the current user", alias = "me")]
pub struct Options {}

pub fn handle(_options: &Options, state: &State) -> Result<()> {
    let user = state.user()?;

    log::info!(
        "You are logged in as `{}` ({})",
        user.display_name(),
        user.email.as_deref().unwrap_or(&user.id)
    );

    if let Some(url) = state.ctx.url.as_deref() {
        log::info!("Backend: {}", urlify(url));
    }

    Ok(())
}
