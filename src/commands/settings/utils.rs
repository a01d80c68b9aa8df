use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde_json::json;

use super::types::{Profile, UserSettings};
use crate::query::deps::{profile_key, settings_key};
use crate::query::{Change, Entity, Mutation, QueryClient, QueryState, ReadOptions};
use crate::state::remote::{from_row, Remote, Select};

const SETTINGS_TABLE: &str = "user_settings";
const PROFILES_TABLE: &str = "profiles";

pub async fn fetch_settings(remote: &dyn Remote, user_id: &str) -> Result<UserSettings> {
    match remote
        .select_single(SETTINGS_TABLE, &Select::new().eq("user_id", user_id))
        .await?
    {
        Some(row) => from_row(row),
        None => Ok(UserSettings::defaults(user_id)),
    }
}

pub async fn save_settings(remote: &dyn Remote, settings: UserSettings) -> Result<UserSettings> {
    let row = remote
        .upsert(SETTINGS_TABLE, serde_json::to_value(settings)?, "user_id")
        .await?;

    from_row(row)
}

pub async fn fetch_profile(remote: &dyn Remote, user_id: &str) -> Result<Option<Profile>> {
    remote
        .select_single(PROFILES_TABLE, &Select::new().eq("id", user_id))
        .await?
        .map(from_row)
        .transpose()
}

pub async fn update_profile(
    remote: &dyn Remote,
    user_id: &str,
    full_name: &str,
) -> Result<Profile> {
    let rows = remote
        .update(
            PROFILES_TABLE,
            &Select::new().eq("id", user_id),
            json!({ "full_name": full_name, "updated_at": Utc::now() }),
        )
        .await?;

    rows.into_iter()
        .next()
        .ok_or_else(|| anyhow!("No profile exists for this user"))
        .and_then(from_row)
}

pub async fn settings_query(
    cache: &QueryClient,
    remote: Arc<dyn Remote>,
    user_id: &str,
) -> QueryState<UserSettings> {
    let user = user_id.to_string();

    cache
        .read(
            settings_key(user_id),
            move || {
                let remote = remote.clone();
                let user = user.clone();

                async move { fetch_settings(&*remote, &user).await }
            },
            ReadOptions::default(),
        )
        .await
}

pub async fn profile_query(
    cache: &QueryClient,
    remote: Arc<dyn Remote>,
    user_id: &str,
) -> QueryState<Option<Profile>> {
    let user = user_id.to_string();

    cache
        .read(
            profile_key(user_id),
            move || {
                let remote = remote.clone();
                let user = user.clone();

                async move { fetch_profile(&*remote, &user).await }
            },
            ReadOptions::default(),
        )
        .await
}

pub fn save_settings_mutation(
    cache: &QueryClient,
    remote: Arc<dyn Remote>,
) -> Mutation<UserSettings, UserSettings> {
    Mutation::new(cache, move |settings: UserSettings| {
        let remote = remote.clone();

        async move { save_settings(&*remote, settings).await }
    })
    .affects(|settings| vec![Change::new(Entity::Settings, &settings.user_id)])
}

pub fn update_profile_mutation(
    cache: &QueryClient,
    remote: Arc<dyn Remote>,
    user_id: &str,
) -> Mutation<String, Profile> {
    let user = user_id.to_string();
    let owner = user.clone();

    Mutation::new(cache, move |full_name: String| {
        let remote = remote.clone();
        let user = user.clone();

        async move { update_profile(&*remote, &user, &full_name).await }
    })
    .affects(move |_| vec![Change::new(Entity::Profile, &owner)])
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::state::memory::MemoryRemote;

    #[tokio::test]
    async fn test_missing_settings_row_reads_as_defaults() {
        let remote = MemoryRemote::new();

        let settings = fetch_settings(&remote, "u1").await.unwrap();

        assert_eq!(settings, UserSettings::defaults("u1"));
        assert!(remote.rows(SETTINGS_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_saving_twice_keeps_one_row() {
        let cache = QueryClient::new();
        let remote = Arc::new(MemoryRemote::new());
        let save = save_settings_mutation(&cache, remote.clone());

        let mut settings = UserSettings::defaults("u1");
        settings.api_key = Some("sk-first".to_string());
        save.mutate(settings.clone()).await.unwrap();

        let before = settings_query(&cache, remote.clone(), "u1").await;
        assert_eq!(before.data.unwrap().api_key.as_deref(), Some("sk-first"));

        settings.api_key = Some("sk-second".to_string());
        settings.push_notifications = true;
        save.mutate(settings).await.unwrap();

        assert_eq!(remote.rows(SETTINGS_TABLE).len(), 1);

        let after = settings_query(&cache, remote.clone(), "u1").await;
        let after = after.data.unwrap();
        assert_eq!(after.api_key.as_deref(), Some("sk-second"));
        assert!(after.push_notifications);
    }

    #[tokio::test]
    async fn test_profile_update() {
        let cache = QueryClient::new();
        let remote = Arc::new(MemoryRemote::new());
        remote.seed(
            PROFILES_TABLE,
            json!({ "id": "u1", "full_name": null, "avatar_url": null, "updated_at": null }),
        );

        let profile = profile_query(&cache, remote.clone(), "u1")
            .await
            .data
            .unwrap();
        assert_eq!((*profile).clone().and_then(|p| p.full_name), None);

        update_profile_mutation(&cache, remote.clone(), "u1")
            .mutate("Ada Lovelace".to_string())
            .await
            .unwrap();

        let profile = profile_query(&cache, remote.clone(), "u1")
            .await
            .data
            .unwrap();
        assert_eq!(
            (*profile).clone().and_then(|p| p.full_name).as_deref(),
            Some("Ada Lovelace")
        );
    }

    #[tokio::test]
    async fn test_missing_profile_cannot_be_updated() {
        let remote = MemoryRemote::new();

        assert!(update_profile(&remote, "ghost", "Nobody").await.is_err());
    }
}
