mod flags_auth;

use anyhow::Result;
use clap::Parser;

use self::flags_auth::flags_login;
use crate::config::TOKEN_ENV;
use crate::state::session::AuthEvent;
use crate::state::State;
use crate::store::Store;

#[derive(Debug, Parser, Default, PartialEq, Eq)]
#[clap(about = "Login to your backend")]
pub struct Options {
    #[clap(long = "email", help = "Email")]
    pub email: Option<String>,
    #[clap(
        long = "password",
        help = "Password",
        long_help = "Password, prompted for when only `--email` is given"
    )]
    pub password: Option<String>,
    #[clap(long = "token", help = "Access token of an existing session")]
    pub token: Option<String>,
    #[clap(
        long = "url",
        help = "Base URL of the backend, saved for later commands"
    )]
    pub url: Option<String>,
    #[clap(
        long = "anon-key",
        help = "Public anon key of the backend, saved for later commands"
    )]
    pub anon_key: Option<String>,
}

pub async fn handle(options: Options, state: &mut State) -> Result<()> {
    if options.url.is_some() || options.anon_key.is_some() {
        if let Some(url) = options.url.clone() {
            state.ctx.url = Some(url);
        }

        if let Some(anon_key) = options.anon_key.clone() {
            state.ctx.anon_key = Some(anon_key);
        }

        state.ctx.save().await?;
        state.connect(state.ctx.url.clone(), state.ctx.anon_key.clone(), None)?;
    }

    let token = match options {
        Options {
            token: None,
            email: None,
            password: None,
            ..
        } => match std::env::var(TOKEN_ENV) {
            Ok(token) => token,
            Err(_) => flags_login(options, &state.http).await?,
        },
        options => flags_login(options, &state.http).await?,
    };

    token_login(&token, state).await
}

pub async fn token_login(token: &str, state: &mut State) -> Result<()> {
    state.set_token(Some(token.to_string()))?;
    state.login().await?;

    let user = state.user()?.clone();

    if Some(&user.id) == state.ctx.default_user.as_ref()
        && state.auth.authorized.get(&user.id).map(String::as_str) == Some(token)
    {
        log::info!(
            "Nothing was changed. You are already logged in as: `{}`",
            user.display_name()
        );
        return Ok(());
    }

    state
        .auth
        .authorized
        .insert(user.id.clone(), token.to_string());
    state.auth.save().await?;

    state.ctx.default_user = Some(user.id.clone());
    state.ctx.save().await?;

    state.emit(AuthEvent::UserUpdated(user.clone()));

    log::info!(
        "Logged in as: `{}` ({})",
        user.display_name(),
        user.email.as_deref().unwrap_or(&user.id)
    );

    Ok(())
}
