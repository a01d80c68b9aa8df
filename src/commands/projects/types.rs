use std::fmt::Display;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    InProgress,
    Ready,
    Deployed,
}

impl ProjectStatus {
    /// Projects only move forward, nothing returns to `in-progress`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::InProgress, Self::Ready)
                | (Self::InProgress, Self::Deployed)
                | (Self::Ready, Self::Deployed)
        )
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            Self::InProgress => "in-progress",
            Self::Ready => "ready",
            Self::Deployed => "deployed",
        };

        write!(f, "{status}")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Project {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub prompt: Option<String>,
    pub status: ProjectStatus,
    pub framework: Option<String>,
    #[serde(default)]
    pub downloads: i64,
}

/// Row written by the create form; the store fills in id, status and counters.
#[derive(Debug, Serialize, Clone, Default)]
pub struct NewProject {
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
}

/// Fields editable from the edit form.
#[derive(Debug, Serialize, Clone)]
pub struct ProjectChanges {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct UserStats {
    #[serde(default)]
    pub total_downloads: i64,
    #[serde(default)]
    pub deployed_count: i64,
    #[serde(default)]
    pub in_progress_count: i64,
}
