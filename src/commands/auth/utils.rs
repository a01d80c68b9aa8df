use anyhow::{anyhow, Result};
use serde_json::Value;

use super::types::{PasswordGrant, Session, UpdateUser, User, UserMetadata};
use crate::state::http::{HttpClient, AUTH_PATH};

pub async fn sign_in_with_password(
    http: &HttpClient,
    email: &str,
    password: &str,
) -> Result<Session> {
    let body = serde_json::to_value(PasswordGrant {
        email: email.to_string(),
        password: password.to_string(),
    })?;

    http.request::<Session>(
        "POST",
        &format!("{AUTH_PATH}/token"),
        &[("grant_type".to_string(), "password".to_string())],
        Some(body),
        None,
    )
    .await?
    .ok_or_else(|| anyhow!("Error while parsing login response"))
}

pub async fn get_user(http: &HttpClient) -> Result<User> {
    http.request::<User>("GET", &format!("{AUTH_PATH}/user"), &[], None, None)
        .await?
        .ok_or_else(|| anyhow!("Error while parsing user response"))
}

pub async fn update_user_metadata(http: &HttpClient, metadata: UserMetadata) -> Result<User> {
    http.request::<User>(
        "PUT",
        &format!("{AUTH_PATH}/user"),
        &[],
        Some(serde_json::to_value(UpdateUser { data: metadata })?),
        None,
    )
    .await?
    .ok_or_else(|| anyhow!("Error while parsing user response"))
}

pub async fn sign_out(http: &HttpClient) -> Result<()> {
    http.request::<Value>("POST", &format!("{AUTH_PATH}/logout"), &[], None, None)
        .await?;

    Ok(())
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> HttpClient {
        HttpClient::new(Some(server.uri()), Some("anon".to_string()), None).unwrap()
    }

    #[tokio::test]
    async fn test_password_sign_in() {
        let server = MockServer::start().await;
        let credentials = json!({ "email": "ada@example.com", "password": "hunter2" });
        let session = json!({
            "access_token": "jwt",
            "refresh_token": "refresh",
            "token_type": "bearer",
            "user": { "id": "u1", "email": "ada@example.com", "user_metadata": {} },
        });

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_json(credentials))
            .respond_with(ResponseTemplate::new(200).set_body_json(session))
            .mount(&server)
            .await;

        let session = sign_in_with_password(&client(&server), "ada@example.com", "hunter2")
            .await
            .unwrap();

        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.user.display_name(), "ada@example.com");
    }

    #[tokio::test]
    async fn test_invalid_credentials_message() {
        let server = MockServer::start().await;
        let rejection = json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials",
        });

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(rejection))
            .mount(&server)
            .await;

        let error = sign_in_with_password(&client(&server), "ada@example.com", "nope")
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Invalid login credentials");
    }
}
