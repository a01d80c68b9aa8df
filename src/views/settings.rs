use anyhow::Result;
use console::style;

use super::{heading, with_state};
use crate::commands::auth::types::User;
use crate::commands::settings::types::{Profile, UserSettings};
use crate::query::QueryState;
use crate::store::preferences::Theme;
use crate::utils::mask_secret;

fn flag(enabled: bool) -> String {
    if enabled {
        style("on").green().to_string()
    } else {
        style("off").dim().to_string()
    }
}

pub fn render(
    user: &User,
    settings: &QueryState<UserSettings>,
    profile: &QueryState<Option<Profile>>,
    theme: Theme,
) -> Result<String> {
    let api = with_state(settings, |settings| {
        Ok(format!(
            "{}\n  OpenAI API Key: {}\n\n{}\n  Email: {}\n  Push:  {}",
            style("API Configuration").bold(),
            settings
                .api_key
                .as_deref()
                .map_or_else(|| "not set".to_string(), mask_secret),
            style("Notifications").bold(),
            flag(settings.email_notifications),
            flag(settings.push_notifications),
        ))
    })?;

    let account = with_state(profile, |profile| {
        let name = profile
            .as_ref()
            .and_then(|profile| profile.full_name.clone())
            .or_else(|| user.user_metadata.full_name.clone())
            .unwrap_or_else(|| "-".to_string());

        Ok(format!(
            "{}\n  Name:  {name}\n  Email: {}",
            style("Profile").bold(),
            user.email.as_deref().unwrap_or("-")
        ))
    })?;

    Ok(format!(
        "{}\n\n{api}\n\n{account}\n\n{}\n  Theme: {theme}",
        heading("Settings", "Manage your account and API configuration"),
        style("Appearance").bold(),
    ))
}
