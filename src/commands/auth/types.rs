use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct UserMetadata {
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl User {
    pub fn display_name(&self) -> String {
        self.user_metadata
            .full_name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// Token grant returned by the auth service.
#[derive(Debug, Deserialize, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct PasswordGrant {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateUser {
    pub data: UserMetadata,
}
