use anyhow::{Context, Result};

use super::Options;
use crate::commands::auth::utils::sign_in_with_password;
use crate::state::http::HttpClient;

pub async fn flags_login(options: Options, http: &HttpClient) -> Result<String> {
    match options {
        Options {
            token: Some(token), ..
        } => Ok(token),

        Options {
            email: Some(email),
            password: Some(password),
            ..
        } => login_with_credentials(http, &email, &password).await,

        Options {
            email: Some(email),
            ..
        } => {
            let password = dialoguer::Password::new()
                .with_prompt("Password")
                .interact()
                .context("Error getting password")?;

            login_with_credentials(http, &email, &password).await
        }

        Options { .. } => {
            let email = dialoguer::Input::<String>::new()
                .with_prompt("Email")
                .interact_text()
                .context("Error getting email")?;

            let password = dialoguer::Password::new()
                .with_prompt("Password")
                .interact()
                .context("Error getting password")?;

            login_with_credentials(http, &email, &password).await
        }
    }
}

async fn login_with_credentials(http: &HttpClient, email: &str, password: &str) -> Result<String> {
    let session = sign_in_with_password(http, email, password)
        .await
        .context("Error while logging in")?;

    Ok(session.access_token)
}
