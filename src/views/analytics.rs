use std::io::Write;

use anyhow::{anyhow, Result};
use tabwriter::TabWriter;

use super::{heading, with_state};
use crate::commands::projects::types::{Project, UserStats};
use crate::commands::projects::utils::style_status;
use crate::query::QueryState;

pub fn render(stats: &QueryState<UserStats>, top: &QueryState<Vec<Project>>) -> Result<String> {
    let kpis = with_state(stats, |stats| {
        with_state(top, |top| Ok(kpi_cards(stats, top)))
    })?;

    let table = with_state(top, |top| top_projects(top))?;

    Ok(format!(
        "{}\n\n{kpis}\n\n{table}",
        heading("Analytics", "Track the performance of your generated apps.")
    ))
}

fn kpi_cards(stats: &UserStats, top: &[Project]) -> String {
    let top_name = top.first().map_or("N/A", |project| project.name.as_str());

    let lines = [
        format!("Total Downloads: {}", stats.total_downloads),
        format!("Apps Deployed:   {}", stats.deployed_count),
        format!("In Progress:     {}", stats.in_progress_count),
        format!("Top Project:     {top_name}"),
    ];

    lines.join("\n")
}

fn top_projects(top: &[Project]) -> Result<String> {
    if top.is_empty() {
        return Ok("Top Projects\nNo projects to rank yet.".to_string());
    }

    let mut tw = TabWriter::new(vec![]);

    writeln!(&mut tw, "#\tNAME\tSTATUS\tDOWNLOADS")?;

    for (rank, project) in top.iter().enumerate() {
        writeln!(
            &mut tw,
            "{}\t{}\t{}\t{}",
            rank + 1,
            project.name,
            style_status(project.status),
            project.downloads
        )?;
    }

    let table = tw
        .into_inner()
        .map_err(|_| anyhow!("Failed to render the top projects table"))?;

    let table = String::from_utf8(table)?;

    Ok(format!("Top Projects\n{}", table.trim_end()))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::commands::projects::types::ProjectStatus;

    fn loaded<T>(data: T) -> QueryState<T> {
        QueryState {
            data: Some(Arc::new(data)),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_projects_shows_na() {
        let rendered = render(&loaded(UserStats::default()), &loaded(vec![])).unwrap();

        assert!(rendered.contains("Top Project:     N/A"));
        assert!(rendered.contains("No projects to rank yet."));
    }

    #[test]
    fn test_top_project_is_first_ranked() {
        let project = Project {
            id: 1,
            created_at: Utc::now(),
            user_id: "u1".to_string(),
            name: "Weather App".to_string(),
            description: None,
            prompt: None,
            status: ProjectStatus::Deployed,
            framework: None,
            downloads: 1250,
        };

        let stats = UserStats {
            total_downloads: 1250,
            deployed_count: 1,
            in_progress_count: 0,
        };

        let rendered = render(&loaded(stats), &loaded(vec![project])).unwrap();

        assert!(rendered.contains("Total Downloads: 1250"));
        assert!(rendered.contains("Top Project:     Weather App"));
    }
}
