use anyhow::Result;
use console::style;

use super::{heading, with_state, LOADING};
use crate::commands::projects::types::{Project, ProjectStatus};
use crate::commands::projects::utils::{filter_projects, format_projects, style_status};
use crate::config::EXEC_NAME;
use crate::generation::GeneratedArtifact;
use crate::query::QueryState;

pub const NOT_FOUND: &str = "Project Not Found";
const NO_PROMPT: &str = "No prompt was provided for this project.";

#[derive(Debug, Default, Clone)]
pub struct ListFilter {
    pub search: Option<String>,
    pub status: Option<ProjectStatus>,
    /// Only print the ids.
    pub quiet: bool,
}

pub fn list(state: &QueryState<Vec<Project>>, filter: &ListFilter) -> Result<String> {
    with_state(state, |projects| {
        let matching = filter_projects(projects, filter.search.as_deref(), filter.status);

        if filter.quiet {
            return Ok(matching
                .iter()
                .map(|project| project.id.to_string())
                .collect::<Vec<_>>()
                .join(" "));
        }

        if projects.is_empty() {
            return Ok(format!(
                "{}\n\nNo projects yet. Create one with `{EXEC_NAME} projects new`.",
                heading("Projects", "Manage and view all your AI-generated apps."),
            ));
        }

        if matching.is_empty() {
            return Ok("No projects match your search.".to_string());
        }

        Ok(format!(
            "{}\n\n{}",
            heading("Projects", "Manage and view all your AI-generated apps."),
            format_projects(&matching, true)?.join("\n")
        ))
    })
}

/// Missing and inaccessible projects both render the not found state.
pub fn detail(state: &QueryState<Option<Project>>) -> String {
    if state.is_loading {
        return LOADING.to_string();
    }

    match (state.data.as_deref(), &state.error) {
        (Some(Some(project)), _) => render_project(project),
        (Some(None), _) | (None, Some(_)) => not_found(),
        (None, None) => LOADING.to_string(),
    }
}

pub fn not_found() -> String {
    format!(
        "{}\nCould not load project details. It may have been deleted or you may not have permission to view it.\n\nBack to projects: `{EXEC_NAME} projects ls`",
        style(NOT_FOUND).bold()
    )
}

fn render_project(project: &Project) -> String {
    let name = style(&project.name).bold();
    let mut lines = vec![
        format!("{name} {}", style_status(project.status)),
        project.description.clone().unwrap_or_default(),
        String::new(),
        style("Original Prompt").bold().to_string(),
        format!("  \"{}\"", project.prompt.as_deref().unwrap_or(NO_PROMPT)),
        String::new(),
        style("Project Info").bold().to_string(),
        format!(
            "  Framework: {}",
            project.framework.as_deref().unwrap_or("N/A")
        ),
        format!("  Created:   {}", project.created_at.format("%b %-d, %Y")),
        format!("  Downloads: {}", project.downloads),
    ];

    if project.status.can_transition_to(ProjectStatus::Deployed) {
        lines.push(String::new());
        lines.push(format!(
            "Deploy it with `{EXEC_NAME} projects deploy {}`",
            project.id
        ));
    }

    lines.join("\n")
}

pub fn artifact(artifact: &GeneratedArtifact) -> String {
    let mut lines = vec![artifact.summary.clone()];

    for section in &artifact.sections {
        lines.push(String::new());
        lines.push(format!("{}:", style(&section.title).bold()));
        lines.extend(section.items.iter().map(|item| format!("  • {item}")));
    }

    lines.push(String::new());
    lines.push(artifact.closing.clone());

    lines.join("\n")
}
