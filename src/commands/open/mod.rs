use anyhow::Result;
use clap::Parser;

use crate::commands::projects::utils::{
    project_query, projects_query, top_projects_query, user_stats_query,
};
use crate::commands::settings::utils::{profile_query, settings_query};
use crate::commands::templates::types::TEMPLATES;
use crate::config::TOP_PROJECTS_LIMIT;
use crate::routes::{guard, Outcome, Route};
use crate::state::State;
use crate::views::projects::ListFilter;
use crate::views::{self, pages, LOADING};

#[derive(Debug, Parser)]
#[clap(about = "Open a dashboard page by its path, e.g. `/projects/12/`")]
pub struct Options {
    #[clap(name = "path", default_value = "/", help = "Path of the page")]
    pub path: String,
}

/// Renders the page at `route`, assuming the guard allowed it.
async fn render(route: Route, path: &str, state: &State) -> Result<String> {
    let remote = state.remote();
    let user = state.session.user();
    let user_id = user.map(|user| user.id.clone()).unwrap_or_default();

    Ok(match (route, user) {
        (Route::Login, _) => pages::login(),
        (Route::NotFound, _) => pages::not_found(path),
        (Route::Community, _) => pages::community(),
        (Route::Support, _) => pages::support(),
        (Route::Templates, _) => views::templates::render(&TEMPLATES)?,
        (Route::Project(id), _) => {
            let project = project_query(&state.cache, remote, id).await;

            views::projects::detail(&project)
        }
        // every other page needs the user
        (_, None) => LOADING.to_string(),
        (Route::Dashboard, Some(user)) => {
            let projects = projects_query(&state.cache, remote, &user_id).await;

            views::dashboard::render(user, &projects)?
        }
        (Route::Projects, Some(_)) => {
            let projects = projects_query(&state.cache, remote, &user_id).await;

            views::projects::list(&projects, &ListFilter::default())?
        }
        (Route::Analytics, Some(_)) => {
            let (stats, top) = tokio::join!(
                user_stats_query(&state.cache, remote.clone(), Some(&user_id)),
                top_projects_query(
                    &state.cache,
                    remote.clone(),
                    &user_id,
                    TOP_PROJECTS_LIMIT,
                ),
            );

            views::analytics::render(&stats, &top)?
        }
        (Route::Settings, Some(user)) => {
            let (settings, profile) = tokio::join!(
                settings_query(&state.cache, remote.clone(), &user_id),
                profile_query(&state.cache, remote.clone(), &user_id),
            );

            views::settings::render(user, &settings, &profile, state.prefs.theme)?
        }
    })
}

/// Resolves the session, applies the route guard and renders where it lands.
pub async fn open(path: &str, state: &mut State) -> Result<String> {
    let mut route = path.parse::<Route>()?;

    // a redirect lands on a page that renders for the same session
    loop {
        let outcome = guard(route, state.resolve_session().await);

        log::debug!("{route} resolved to {outcome:?}");

        match outcome {
            Outcome::Loading => return Ok(LOADING.to_string()),
            Outcome::Redirect(next) => route = next,
            Outcome::Render(route) => return render(route, path, state).await,
        }
    }
}

pub async fn handle(options: Options, state: &mut State) -> Result<()> {
    println!("{}", open(&options.path, state).await?);

    Ok(())
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::commands::auth::types::User;
    use crate::state::memory::MemoryRemote;
    use crate::views::projects::NOT_FOUND;

    async fn signed_in(dir: &std::path::Path, remote: Arc<MemoryRemote>) -> State {
        let mut state = State::for_tests(dir).await.with_remote(remote);

        state.sign_in_as(User {
            id: "u1".to_string(),
            email: Some("ada@example.com".to_string()),
            user_metadata: Default::default(),
        });

        state
    }

    #[tokio::test]
    async fn test_signed_out_lands_on_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = State::for_tests(dir.path()).await;

        let page = open("/projects/", &mut state).await.unwrap();

        assert_eq!(page, pages::login());
    }

    #[tokio::test]
    async fn test_unknown_project_renders_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let mut state = signed_in(dir.path(), remote).await;

        let page = open("/projects/999/", &mut state).await.unwrap();

        assert!(page.contains(NOT_FOUND));
    }

    #[tokio::test]
    async fn test_known_project_renders_detail() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        remote.seed(
            "projects",
            json!({
                "id": 3,
                "created_at": "2024-05-01T10:00:00Z",
                "user_id": "u1",
                "name": "Recipe Finder",
                "description": null,
                "prompt": "Recipe sharing platform",
                "status": "ready",
                "framework": null,
                "downloads": 12,
            }),
        );
        let mut state = signed_in(dir.path(), remote).await;

        let page = open("/projects/3", &mut state).await.unwrap();

        assert!(page.contains("Recipe Finder"));
        assert!(page.contains("Recipe sharing platform"));
    }

    #[tokio::test]
    async fn test_login_redirects_home_when_signed_in() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let mut state = signed_in(dir.path(), remote).await;

        let page = open("/login/", &mut state).await.unwrap();

        assert!(page.contains("Welcome back"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_public() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = State::for_tests(dir.path()).await;

        let page = open("/nowhere/", &mut state).await.unwrap();

        assert!(page.contains("404"));
    }
}
