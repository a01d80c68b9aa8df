use tokio::sync::broadcast;

use crate::commands::auth::types::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// A token is known but has not been checked against the auth service yet.
    Unknown,
    Authenticated(User),
    Unauthenticated,
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut,
    UserUpdated(User),
}

/// In-process auth state change channel.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(16);

        Self { sender }
    }
}

impl AuthEvents {
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: AuthEvent) {
        log::debug!("auth event: {event:?}");

        // no subscribers is fine
        self.sender.send(event).ok();
    }

    pub fn subscribers(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let events = AuthEvents::default();
        let mut rx = events.subscribe();

        events.emit(AuthEvent::SignedOut);

        assert_eq!(rx.recv().await.unwrap(), AuthEvent::SignedOut);

        drop(rx);
        assert_eq!(events.subscribers(), 0);
    }
}
