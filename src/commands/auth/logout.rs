use anyhow::{ensure, Result};
use clap::Parser;

use super::utils::sign_out;
use crate::config::EXEC_NAME;
use crate::state::session::AuthEvent;
use crate::state::State;
use crate::store::Store;

#[derive(Debug, Parser)]
#[clap(about = "Logout the current user")]
pub struct Options {}

pub async fn handle(_options: Options, state: &mut State) -> Result<()> {
    let user_id = state.ctx.default_user.clone();

    ensure!(
        user_id.is_some() || state.token().is_some(),
        "You are not logged in. Please run `{} auth login` first.",
        EXEC_NAME
    );

    // the local session is cleared even if the backend already forgot the token
    if state.token().is_some() {
        if let Err(error) = sign_out(&state.http).await {
            log::debug!("Remote sign out failed: {error}");
        }
    }

    if let Some(user_id) = user_id {
        state.auth.authorized.remove(&user_id);
        state.auth.save().await?;
    }

    state.ctx.default_user = None;
    state.ctx.save().await?;

    state.set_token(None)?;
    state.emit(AuthEvent::SignedOut);

    log::info!("You have been logged out");

    Ok(())
}
