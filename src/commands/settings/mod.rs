pub mod types;
pub mod utils;

use anyhow::{ensure, Result};
use clap::{Parser, Subcommand};

use self::types::UserSettings;
use self::utils::{profile_query, save_settings_mutation, settings_query, update_profile_mutation};
use crate::commands::auth::types::UserMetadata;
use crate::commands::auth::utils::update_user_metadata;
use crate::state::session::AuthEvent;
use crate::state::State;
use crate::views::settings::render;

#[derive(Debug, Parser)]
#[clap(about = "Show your settings")]
pub struct ShowOptions {}

#[derive(Debug, Parser, Default)]
#[clap(about = "Change your settings")]
pub struct SetOptions {
    #[clap(long = "api-key", help = "OpenAI API key used for generation")]
    pub api_key: Option<String>,
    #[clap(
        long = "email-notifications",
        value_name = "BOOL",
        help = "Receive emails about your projects"
    )]
    pub email_notifications: Option<bool>,
    #[clap(
        long = "push-notifications",
        value_name = "BOOL",
        help = "Receive push notifications"
    )]
    pub push_notifications: Option<bool>,
    #[clap(long = "full-name", help = "Name shown on your profile")]
    pub full_name: Option<String>,
}

impl SetOptions {
    fn changes_settings(&self) -> bool {
        self.api_key.is_some()
            || self.email_notifications.is_some()
            || self.push_notifications.is_some()
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Show(ShowOptions),
    Set(SetOptions),
}

#[derive(Debug, Parser)]
#[clap(about = "Manage your account and API configuration")]
pub struct Options {
    #[clap(subcommand)]
    pub commands: Commands,
}

/// Merges the given flags into the stored settings and writes them back.
pub async fn update_settings(state: &State, options: &SetOptions) -> Result<UserSettings> {
    let user = state.user()?;

    let current = settings_query(&state.cache, state.remote(), &user.id)
        .await
        .into_result()?;

    let mut settings = (*current).clone();

    if let Some(api_key) = &options.api_key {
        let api_key = api_key.trim().to_string();

        settings.api_key = Some(api_key).filter(|key| !key.is_empty());
    }

    if let Some(enabled) = options.email_notifications {
        settings.email_notifications = enabled;
    }

    if let Some(enabled) = options.push_notifications {
        settings.push_notifications = enabled;
    }

    save_settings_mutation(&state.cache, state.remote())
        .mutate(settings)
        .await
}

async fn update_name(state: &mut State, full_name: &str) -> Result<()> {
    let user_id = state.user()?.id.clone();

    update_profile_mutation(&state.cache, state.remote(), &user_id)
        .mutate(full_name.to_string())
        .await?;

    let user = update_user_metadata(
        &state.http,
        UserMetadata {
            full_name: Some(full_name.to_string()),
        },
    )
    .await?;

    state.emit(AuthEvent::UserUpdated(user));

    Ok(())
}

pub async fn handle(options: Options, state: &mut State) -> Result<()> {
    match options.commands {
        Commands::Show(_) => {
            let user = state.user()?;

            let (settings, profile) = tokio::join!(
                settings_query(&state.cache, state.remote(), &user.id),
                profile_query(&state.cache, state.remote(), &user.id),
            );

            println!("{}", render(user, &settings, &profile, state.prefs.theme)?);
        }

        Commands::Set(options) => {
            ensure!(
                options.changes_settings() || options.full_name.is_some(),
                "Nothing to change, see `settings set --help`"
            );

            if options.changes_settings() {
                update_settings(state, &options).await?;
            }

            if let Some(full_name) = &options.full_name {
                update_name(state, full_name).await?;
            }

            log::info!("Your preferences have been updated successfully");
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;
    use crate::commands::auth::types::User;
    use crate::state::memory::MemoryRemote;

    #[tokio::test]
    async fn test_flags_merge_into_stored_settings() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let mut state = State::for_tests(dir.path())
            .await
            .with_remote(remote.clone());
        state.sign_in_as(User {
            id: "u1".to_string(),
            email: None,
            user_metadata: Default::default(),
        });

        update_settings(
            &state,
            &SetOptions {
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let settings = update_settings(
            &state,
            &SetOptions {
                push_notifications: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert!(settings.push_notifications);
        assert!(settings.email_notifications);
        assert_eq!(remote.rows("user_settings").len(), 1);
    }
}
