pub mod http;
#[cfg(test)]
pub mod memory;
pub mod remote;
pub mod session;

use std::sync::Arc;

use anyhow::{bail, ensure, Result};
use tokio::sync::broadcast;

use self::http::HttpClient;
use self::remote::Remote;
use self::session::{AuthEvent, AuthEvents, SessionState};
use crate::commands::auth::types::User;
use crate::commands::auth::utils::get_user;
use crate::config::{ANON_KEY_ENV, EXEC_NAME, URL_ENV};
use crate::query::{Change, Entity, QueryClient};
use crate::store::auth::Auth;
use crate::store::context::Context;
use crate::store::preferences::Preferences;
use crate::store::Store;

pub struct State {
    pub auth: Auth,
    pub ctx: Context,
    pub prefs: Preferences,
    pub http: HttpClient,
    pub cache: QueryClient,
    pub session: SessionState,
    pub events: AuthEvents,
    remote: Arc<dyn Remote>,
    token: Option<String>,
    // applied by `sync_events`, dropped by `shutdown`
    subscription: Option<broadcast::Receiver<AuthEvent>>,
}

#[derive(Debug, Default)]
pub struct StateOptions {
    pub override_token: Option<String>,
    pub override_url: Option<String>,
    pub override_anon_key: Option<String>,
}

impl State {
    pub async fn new(options: StateOptions) -> Result<Self> {
        let auth = Auth::new().await?;
        let ctx = Context::new().await?;
        let prefs = Preferences::new().await?;

        // use the override token if provided, otherwise the token of the default user
        let token = options.override_token.or_else(|| {
            ctx.default_user
                .as_ref()
                .and_then(|user| auth.authorized.get(user))
                .cloned()
        });

        let url = options
            .override_url
            .or_else(|| std::env::var(URL_ENV).ok())
            .or_else(|| ctx.url.clone());

        let anon_key = options
            .override_anon_key
            .or_else(|| std::env::var(ANON_KEY_ENV).ok())
            .or_else(|| ctx.anon_key.clone());

        let http = HttpClient::new(url, anon_key, token.clone())?;

        let session = if token.is_some() {
            SessionState::Unknown
        } else {
            SessionState::Unauthenticated
        };

        let events = AuthEvents::default();
        let subscription = Some(events.subscribe());

        Ok(Self {
            auth,
            ctx,
            prefs,
            remote: Arc::new(http.clone()),
            http,
            cache: QueryClient::new(),
            session,
            events,
            token,
            subscription,
        })
    }

    /// The remote store, shared with cache fetchers.
    pub fn remote(&self) -> Arc<dyn Remote> {
        self.remote.clone()
    }

    /// Routes every data access through `remote` instead of the http client.
    pub fn with_remote(mut self, remote: Arc<dyn Remote>) -> Self {
        self.remote = remote;
        self
    }

    pub fn token(&self) -> Option<String> {
        self.token.clone()
    }

    /// Points the client at a backend and token, dropping everything cached for the old one.
    pub fn connect(
        &mut self,
        url: Option<String>,
        anon_key: Option<String>,
        token: Option<String>,
    ) -> Result<()> {
        self.http = HttpClient::new(url, anon_key, token.clone())?;
        self.remote = Arc::new(self.http.clone());
        self.session = if token.is_some() {
            SessionState::Unknown
        } else {
            SessionState::Unauthenticated
        };
        self.token = token;
        self.cache = QueryClient::new();

        Ok(())
    }

    /// Swaps the access token, keeping the current backend.
    pub fn set_token(&mut self, token: Option<String>) -> Result<()> {
        let anon_key = self
            .http
            .headers
            .get("apikey")
            .and_then(|key| key.to_str().ok())
            .map(str::to_string);

        let url = Some(self.http.base_url.clone()).filter(|url| !url.is_empty());

        self.connect(url, anon_key, token)
    }

    /// Resolves an `Unknown` session against the auth service. Never fails; a rejected token
    /// leaves the session unauthenticated.
    pub async fn resolve_session(&mut self) -> &SessionState {
        if self.session == SessionState::Unknown {
            match get_user(&self.http).await {
                Ok(user) => self.emit(AuthEvent::SignedIn(user)),
                Err(error) => {
                    log::debug!("Session rejected: {error}");
                    self.session = SessionState::Unauthenticated;
                }
            }
        }

        &self.session
    }

    /// Login to the API
    pub async fn login(&mut self) -> Result<()> {
        ensure!(
            self.token.is_some(),
            "You are not logged in. Please run `{} auth login` first.",
            EXEC_NAME
        );

        if self.session == SessionState::Unknown {
            match get_user(&self.http).await {
                Ok(user) => self.emit(AuthEvent::SignedIn(user)),
                Err(error) => {
                    self.session = SessionState::Unauthenticated;

                    bail!(
                        "Your session is no longer valid ({error}). Please run `{EXEC_NAME} auth login` again."
                    );
                }
            }
        }

        Ok(())
    }

    /// Publishes `event` and applies it to this state.
    pub fn emit(&mut self, event: AuthEvent) {
        self.events.emit(event);
        self.sync_events();
    }

    /// Applies every auth event received since the last call. Returns how many were applied.
    pub fn sync_events(&mut self) -> usize {
        let Some(mut subscription) = self.subscription.take() else {
            return 0;
        };

        let mut received = vec![];

        loop {
            match subscription.try_recv() {
                Ok(event) => received.push(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    log::warn!("Missed {skipped} auth events");
                }
                Err(_) => break,
            }
        }

        self.subscription = Some(subscription);

        let applied = received.len();

        for event in received {
            self.apply(event);
        }

        applied
    }

    fn apply(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(user) => {
                self.session = SessionState::Authenticated(user);
            }
            AuthEvent::SignedOut => {
                self.session = SessionState::Unauthenticated;
                // cached reads belong to the previous user
                self.cache = QueryClient::new();
            }
            AuthEvent::UserUpdated(user) => {
                let change = Change::new(Entity::User, &user.id);

                self.cache.invalidate_change(&change);
                self.session = SessionState::Authenticated(user);
            }
        }
    }

    /// The signed in user; requires [`State::login`] first.
    pub fn user(&self) -> Result<&User> {
        self.session.user().ok_or_else(|| {
            anyhow::anyhow!(
                "You are not logged in. Please run `{} auth login` first.",
                EXEC_NAME
            )
        })
    }

    /// Applies the remaining auth events and unsubscribes.
    pub fn shutdown(mut self) {
        let applied = self.sync_events();

        self.subscription = None;

        log::debug!(
            "state shut down after {applied} auth events with {} cached queries",
            self.cache.len()
        );
    }
}

#[cfg(test)]
impl State {
    /// A signed out state whose stores live in `dir`.
    pub async fn for_tests(dir: &std::path::Path) -> Self {
        let auth = Auth::load_from(&dir.join("auth.json")).await.unwrap();
        let ctx = Context::load_from(&dir.join("context.json")).await.unwrap();
        let prefs = Preferences::load_from(&dir.join("preferences.json"))
            .await
            .unwrap();
        let http = HttpClient::new(None, None, None).unwrap();
        let events = AuthEvents::default();

        Self {
            auth,
            ctx,
            prefs,
            remote: Arc::new(http.clone()),
            http,
            cache: QueryClient::new(),
            session: SessionState::Unauthenticated,
            subscription: Some(events.subscribe()),
            events,
            token: None,
        }
    }

    /// Marks `user` as signed in without asking the auth service.
    pub fn sign_in_as(&mut self, user: User) {
        self.token = Some("test-token".to_string());
        self.session = SessionState::Authenticated(user);
    }
}
