use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserSettings {
    pub user_id: String,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub api_key: Option<String>,
}

impl UserSettings {
    /// What a user without a settings row sees.
    pub fn defaults(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            email_notifications: true,
            push_notifications: false,
            api_key: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
