use anyhow::Result;
use console::style;

use super::{heading, with_state};
use crate::commands::auth::types::User;
use crate::commands::projects::types::{Project, ProjectStatus};
use crate::commands::projects::utils::style_status;
use crate::config::EXEC_NAME;
use crate::generation::SUGGESTIONS;
use crate::query::QueryState;
use crate::utils::relative_time;

const RECENT: usize = 3;

pub fn render(user: &User, projects: &QueryState<Vec<Project>>) -> Result<String> {
    let summary = with_state(projects, |projects| Ok(summary(projects)))?;

    let suggestions = SUGGESTIONS
        .iter()
        .map(|suggestion| format!("  {EXEC_NAME} generate \"{suggestion}\""))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        "{}\n\nWelcome back, {}\n\n{summary}\n\n{}\n{suggestions}",
        heading(
            "Build Apps with AI",
            "Transform your ideas into production-ready apps."
        ),
        style(user.display_name()).bold(),
        style("Quick ideas").bold(),
    ))
}

fn summary(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "You have no projects yet.".to_string();
    }

    let count = |status: ProjectStatus| projects.iter().filter(|p| p.status == status).count();

    let mut lines = vec![format!(
        "{} projects: {} deployed, {} ready, {} in progress",
        projects.len(),
        count(ProjectStatus::Deployed),
        count(ProjectStatus::Ready),
        count(ProjectStatus::InProgress),
    )];

    lines.push(style("Recent Activity").bold().to_string());

    // the list is ordered newest first
    lines.extend(projects.iter().take(RECENT).map(|project| {
        format!(
            "  {} {} ({} ago)",
            project.name,
            style_status(project.status),
            relative_time(project.created_at)
        )
    }));

    lines.join("\n")
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_empty_dashboard_offers_suggestions() {
        let user = User {
            id: "u1".to_string(),
            email: Some("ada@example.com".to_string()),
            user_metadata: Default::default(),
        };

        let rendered = render(
            &user,
            &QueryState {
                data: Some(Arc::new(vec![])),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(rendered.contains("ada@example.com"));
        assert!(rendered.contains("You have no projects yet."));
        assert!(rendered.contains("Expense tracker"));
    }
}
