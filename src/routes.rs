use std::fmt::Display;
use std::str::FromStr;

use crate::state::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Projects,
    Project(i64),
    Templates,
    Community,
    Support,
    Analytics,
    Settings,
    Login,
    NotFound,
}

impl Route {
    /// Only the login view and the not found view render without a session.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::NotFound)
    }
}

/// Plain digits only, `+5` or `05` are not project ids.
fn is_id(segment: &str) -> bool {
    !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'))
}

impl FromStr for Route {
    type Err = std::convert::Infallible;

    /// Never fails, unknown paths resolve to [`Route::NotFound`].
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let path = path.trim();
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);

        let segments = if path.is_empty() {
            vec![]
        } else {
            path.split('/').collect::<Vec<_>>()
        };

        Ok(match segments.as_slice() {
            [] => Self::Dashboard,
            ["projects"] => Self::Projects,
            ["projects", id] if is_id(id) => id.parse().map_or(Self::NotFound, Self::Project),
            ["templates"] => Self::Templates,
            ["community"] => Self::Community,
            ["support"] => Self::Support,
            ["analytics"] => Self::Analytics,
            ["settings"] => Self::Settings,
            ["login"] => Self::Login,
            _ => Self::NotFound,
        })
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "/"),
            Self::Projects => write!(f, "/projects/"),
            Self::Project(id) => write!(f, "/projects/{id}/"),
            Self::Templates => write!(f, "/templates/"),
            Self::Community => write!(f, "/community/"),
            Self::Support => write!(f, "/support/"),
            Self::Analytics => write!(f, "/analytics/"),
            Self::Settings => write!(f, "/settings/"),
            Self::Login => write!(f, "/login/"),
            Self::NotFound => write!(f, "/404/"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The session has not been resolved yet.
    Loading,
    Redirect(Route),
    Render(Route),
}

pub fn guard(route: Route, session: &SessionState) -> Outcome {
    match (route, session) {
        (Route::Login, session) if session.is_authenticated() => {
            Outcome::Redirect(Route::Dashboard)
        }
        (route, _) if route.is_public() => Outcome::Render(route),
        (_, SessionState::Unknown) => Outcome::Loading,
        (_, SessionState::Unauthenticated) => Outcome::Redirect(Route::Login),
        (route, SessionState::Authenticated(_)) => Outcome::Render(route),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::commands::auth::types::User;

    fn parse(path: &str) -> Route {
        path.parse().unwrap()
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(parse("/"), Route::Dashboard);
        assert_eq!(parse(""), Route::Dashboard);
        assert_eq!(parse("/projects/"), Route::Projects);
        assert_eq!(parse("/projects"), Route::Projects);
        assert_eq!(parse("/projects/42/"), Route::Project(42));
        assert_eq!(parse("/projects/0/"), Route::Project(0));
        assert_eq!(parse("projects/42"), Route::Project(42));
        assert_eq!(parse("/settings/"), Route::Settings);
        assert_eq!(parse("/login"), Route::Login);
    }

    #[test]
    fn test_unknown_paths_are_not_found() {
        assert_eq!(parse("/projects/abc/"), Route::NotFound);
        assert_eq!(parse("/projects/1/2/"), Route::NotFound);
        assert_eq!(parse("/projects/+5/"), Route::NotFound);
        assert_eq!(parse("/projects/-5/"), Route::NotFound);
        assert_eq!(parse("/projects/05/"), Route::NotFound);
        assert_eq!(parse("/billing/"), Route::NotFound);
    }

    #[test]
    fn test_display_parses_back() {
        for route in [Route::Dashboard, Route::Project(7), Route::Analytics] {
            assert_eq!(parse(&route.to_string()), route);
        }
    }

    #[test]
    fn test_guard() {
        let user = User {
            id: "u1".to_string(),
            email: None,
            user_metadata: Default::default(),
        };
        let signed_in = SessionState::Authenticated(user);

        assert_eq!(
            guard(Route::Projects, &SessionState::Unauthenticated),
            Outcome::Redirect(Route::Login)
        );
        assert_eq!(
            guard(Route::Projects, &SessionState::Unknown),
            Outcome::Loading
        );
        assert_eq!(
            guard(Route::Projects, &signed_in),
            Outcome::Render(Route::Projects)
        );
        assert_eq!(
            guard(Route::Login, &SessionState::Unauthenticated),
            Outcome::Render(Route::Login)
        );
        assert_eq!(
            guard(Route::Login, &signed_in),
            Outcome::Redirect(Route::Dashboard)
        );
        assert_eq!(
            guard(Route::NotFound, &SessionState::Unknown),
            Outcome::Render(Route::NotFound)
        );
    }
}
