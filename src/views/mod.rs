//! Text renderings of the dashboard screens.
//!
//! Every view takes the query state it is driven by and returns the text to print, so the
//! loading, error and not found states are rendered the same way everywhere.

pub mod analytics;
pub mod dashboard;
pub mod pages;
pub mod projects;
pub mod settings;
pub mod templates;

use anyhow::{anyhow, Result};
use console::style;

use crate::query::QueryState;

pub const LOADING: &str = "Loading...";

pub fn heading(title: &str, subtitle: &str) -> String {
    format!("{}\n{}", style(title).bold(), style(subtitle).dim())
}

/// Renders the data of `state` with `render`, a placeholder while it loads, or the fetch error.
pub fn with_state<T>(
    state: &QueryState<T>,
    render: impl FnOnce(&T) -> Result<String>,
) -> Result<String> {
    match (&state.data, &state.error) {
        (Some(data), _) => render(data),
        (None, Some(error)) => Err(anyhow!("{error}")),
        (None, None) => Ok(LOADING.to_string()),
    }
}
