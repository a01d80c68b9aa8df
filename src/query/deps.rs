//! Which cached reads derive from which entity.
//!
//! Every read key is built here, and every mutation invalidates through [`Change`], so a key
//! added for a new view is picked up by all mutations of the entity it reads.

use super::QueryKey;

pub const PROJECTS: &str = "projects";
pub const PROJECT: &str = "project";
pub const TOP_PROJECTS: &str = "topProjects";
pub const USER_STATS: &str = "userStats";
pub const SETTINGS: &str = "settings";
pub const PROFILE: &str = "profile";
pub const USER: &str = "user";

pub fn projects_key(user_id: &str) -> QueryKey {
    QueryKey::new(PROJECTS).with(user_id)
}

pub fn project_key(project_id: i64) -> QueryKey {
    QueryKey::new(PROJECT).with(project_id)
}

pub fn top_projects_key(user_id: &str) -> QueryKey {
    QueryKey::new(TOP_PROJECTS).with(user_id)
}

pub fn user_stats_key(user_id: &str) -> QueryKey {
    QueryKey::new(USER_STATS).with(user_id)
}

pub fn settings_key(user_id: &str) -> QueryKey {
    QueryKey::new(SETTINGS).with(user_id)
}

pub fn profile_key(user_id: &str) -> QueryKey {
    QueryKey::new(PROFILE).with(user_id)
}

pub fn user_key(user_id: &str) -> QueryKey {
    QueryKey::new(USER).with(user_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Project,
    Settings,
    Profile,
    /// The auth user's metadata
    User,
}

/// A successful write to one entity owned by `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub entity: Entity,
    pub user_id: String,
    pub project_id: Option<i64>,
}

impl Change {
    pub fn new(entity: Entity, user_id: &str) -> Self {
        Self {
            entity,
            user_id: user_id.to_string(),
            project_id: None,
        }
    }

    pub fn project(user_id: &str, project_id: i64) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::new(Entity::Project, user_id)
        }
    }

    pub fn dependent_keys(&self) -> Vec<QueryKey> {
        let user_id = self.user_id.as_str();

        match self.entity {
            Entity::Project => vec![
                projects_key(user_id),
                top_projects_key(user_id),
                user_stats_key(user_id),
                // without an id every detail may be affected
                self.project_id
                    .map_or_else(|| QueryKey::new(PROJECT), project_key),
            ],
            Entity::Settings => vec![settings_key(user_id)],
            Entity::Profile => vec![profile_key(user_id)],
            Entity::User => vec![user_key(user_id), profile_key(user_id)],
        }
    }
}
