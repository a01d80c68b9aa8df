use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, ensure, Result};
use console::style;
use serde_json::json;
use tabwriter::TabWriter;

use super::types::{NewProject, Project, ProjectChanges, ProjectStatus, UserStats};
use crate::query::deps::{project_key, projects_key, top_projects_key, user_stats_key};
use crate::query::{Change, Entity, Mutation, QueryClient, QueryState, ReadOptions};
use crate::state::remote::{from_row, from_rows, Remote, Select};
use crate::utils::relative_time;

const TABLE: &str = "projects";

pub async fn fetch_projects(remote: &dyn Remote, user_id: &str) -> Result<Vec<Project>> {
    let rows = remote
        .select(
            TABLE,
            &Select::new()
                .eq("user_id", user_id)
                .order("created_at", false),
        )
        .await?;

    from_rows(rows)
}

/// `None` when the project does not exist or is not visible to the caller.
pub async fn fetch_project(remote: &dyn Remote, id: i64) -> Result<Option<Project>> {
    remote
        .select_single(TABLE, &Select::new().eq("id", id))
        .await?
        .map(from_row)
        .transpose()
}

pub async fn fetch_top_projects(
    remote: &dyn Remote,
    user_id: &str,
    limit: usize,
) -> Result<Vec<Project>> {
    let rows = remote
        .select(
            TABLE,
            &Select::new()
                .eq("user_id", user_id)
                .order("downloads", false)
                .limit(limit),
        )
        .await?;

    from_rows(rows)
}

pub async fn create_project(remote: &dyn Remote, project: NewProject) -> Result<Project> {
    ensure!(!project.name.trim().is_empty(), "Project name is required");

    let row = remote.insert(TABLE, serde_json::to_value(project)?).await?;

    from_row(row)
}

pub async fn update_project(
    remote: &dyn Remote,
    id: i64,
    changes: ProjectChanges,
) -> Result<Project> {
    ensure!(!changes.name.trim().is_empty(), "Project name is required");

    let rows = remote
        .update(
            TABLE,
            &Select::new().eq("id", id),
            serde_json::to_value(changes)?,
        )
        .await?;

    first_updated(rows, id)
}

pub async fn deploy_project(remote: &dyn Remote, id: i64) -> Result<Project> {
    let rows = remote
        .update(
            TABLE,
            &Select::new().eq("id", id),
            json!({ "status": ProjectStatus::Deployed }),
        )
        .await?;

    first_updated(rows, id)
}

pub async fn delete_project(remote: &dyn Remote, id: i64) -> Result<()> {
    remote.delete(TABLE, &Select::new().eq("id", id)).await
}

pub async fn fetch_user_stats(remote: &dyn Remote, user_id: &str) -> Result<UserStats> {
    let value = remote
        .rpc("get_user_stats", json!({ "p_user_id": user_id }))
        .await?;

    // set returning functions answer with an array
    let row = match value {
        serde_json::Value::Array(rows) => rows.into_iter().next().unwrap_or_default(),
        row => row,
    };

    if row.is_null() {
        return Ok(UserStats::default());
    }

    from_row(row)
}

fn first_updated(rows: Vec<serde_json::Value>, id: i64) -> Result<Project> {
    rows.into_iter()
        .next()
        .ok_or_else(|| anyhow!("Project {id} was not found"))
        .and_then(from_row)
}

pub async fn projects_query(
    cache: &QueryClient,
    remote: Arc<dyn Remote>,
    user_id: &str,
) -> QueryState<Vec<Project>> {
    let user = user_id.to_string();

    cache
        .read(
            projects_key(user_id),
            move || {
                let remote = remote.clone();
                let user = user.clone();

                async move { fetch_projects(&*remote, &user).await }
            },
            ReadOptions::default(),
        )
        .await
}

pub async fn project_query(
    cache: &QueryClient,
    remote: Arc<dyn Remote>,
    id: i64,
) -> QueryState<Option<Project>> {
    cache
        .read(
            project_key(id),
            move || {
                let remote = remote.clone();

                async move { fetch_project(&*remote, id).await }
            },
            ReadOptions::default(),
        )
        .await
}

pub async fn top_projects_query(
    cache: &QueryClient,
    remote: Arc<dyn Remote>,
    user_id: &str,
    limit: usize,
) -> QueryState<Vec<Project>> {
    let user = user_id.to_string();

    cache
        .read(
            top_projects_key(user_id),
            move || {
                let remote = remote.clone();
                let user = user.clone();

                async move { fetch_top_projects(&*remote, &user, limit).await }
            },
            ReadOptions::default(),
        )
        .await
}

/// Reads the stats only once the user is known.
pub async fn user_stats_query(
    cache: &QueryClient,
    remote: Arc<dyn Remote>,
    user_id: Option<&str>,
) -> QueryState<UserStats> {
    let user = user_id.unwrap_or_default().to_string();

    cache
        .read(
            user_stats_key(&user),
            {
                let user = user.clone();

                move || {
                    let remote = remote.clone();
                    let user = user.clone();

                    async move { fetch_user_stats(&*remote, &user).await }
                }
            },
            ReadOptions {
                enabled: user_id.is_some(),
            },
        )
        .await
}

pub fn create_mutation(
    cache: &QueryClient,
    remote: Arc<dyn Remote>,
) -> Mutation<NewProject, Project> {
    Mutation::new(cache, move |project: NewProject| {
        let remote = remote.clone();

        async move { create_project(&*remote, project).await }
    })
    .affects(|project| vec![Change::new(Entity::Project, &project.user_id)])
}

pub fn update_mutation(
    cache: &QueryClient,
    remote: Arc<dyn Remote>,
    user_id: &str,
) -> Mutation<(i64, ProjectChanges), Project> {
    let user = user_id.to_string();

    Mutation::new(cache, move |(id, changes): (i64, ProjectChanges)| {
        let remote = remote.clone();

        async move { update_project(&*remote, id, changes).await }
    })
    .affects(move |(id, _)| vec![Change::project(&user, *id)])
}

/// Deploys the given project after checking its current status allows it.
pub fn deploy_mutation(cache: &QueryClient, remote: Arc<dyn Remote>) -> Mutation<Project, Project> {
    Mutation::new(cache, move |project: Project| {
        let remote = remote.clone();

        async move {
            ensure!(
                project.status.can_transition_to(ProjectStatus::Deployed),
                "Project `{}` is {} and cannot be deployed",
                project.name,
                project.status
            );

            deploy_project(&*remote, project.id).await
        }
    })
    .affects(|project| vec![Change::project(&project.user_id, project.id)])
}

pub fn delete_mutation(
    cache: &QueryClient,
    remote: Arc<dyn Remote>,
    user_id: &str,
) -> Mutation<i64, ()> {
    let user = user_id.to_string();

    Mutation::new(cache, move |id: i64| {
        let remote = remote.clone();

        async move { delete_project(&*remote, id).await }
    })
    .affects(move |id| vec![Change::project(&user, *id)])
}

/// Case-insensitive substring search over name and description, AND-ed with the status filter.
pub fn filter_projects<'a>(
    projects: &'a [Project],
    search: Option<&str>,
    status: Option<ProjectStatus>,
) -> Vec<&'a Project> {
    let needle = search.map(str::to_lowercase).unwrap_or_default();

    projects
        .iter()
        .filter(|project| {
            let matches_search = project.name.to_lowercase().contains(&needle)
                || project
                    .description
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(&needle);

            let matches_status = status.map_or(true, |status| project.status == status);

            matches_search && matches_status
        })
        .collect()
}

pub fn style_status(status: ProjectStatus) -> String {
    let label = style(status.to_string());

    match status {
        ProjectStatus::Deployed => label.green(),
        ProjectStatus::Ready => label.blue(),
        ProjectStatus::InProgress => label.yellow(),
    }
    .to_string()
}

pub fn format_projects(projects: &[&Project], title: bool) -> Result<Vec<String>> {
    let mut tw = TabWriter::new(vec![]);

    if title {
        writeln!(&mut tw, "ID\tNAME\tSTATUS\tFRAMEWORK\tDOWNLOADS\tCREATED")?;
    }

    for project in projects {
        writeln!(
            &mut tw,
            "{}\t{}\t{}\t{}\t{}\t{} ago",
            project.id,
            project.name,
            // every status carries escape codes of the same length so columns stay aligned
            style_status(project.status),
            project.framework.as_deref().unwrap_or("-"),
            project.downloads,
            relative_time(project.created_at),
        )?;
    }

    let buffer = tw
        .into_inner()
        .map_err(|_| anyhow!("Failed to render the project table"))?;

    Ok(String::from_utf8(buffer)?
        .lines()
        .map(std::string::ToString::to_string)
        .collect())
}
