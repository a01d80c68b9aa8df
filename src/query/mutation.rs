use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use futures_util::future::{BoxFuture, FutureExt};

use super::{Change, QueryClient};

type Run<A, R> = Box<dyn Fn(A) -> BoxFuture<'static, Result<R>> + Send + Sync>;
type Affects<A> = Box<dyn Fn(&A) -> Vec<Change> + Send + Sync>;

/// Counts one call as pending until dropped, including when the call is cancelled.
struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn new(pending: &'a AtomicUsize) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self(pending)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A write against the store. On success every read derived from the changed entities is
/// invalidated.
pub struct Mutation<A, R> {
    client: QueryClient,
    run: Run<A, R>,
    affects: Affects<A>,
    on_success: Option<Box<dyn Fn(&R) + Send + Sync>>,
    on_error: Option<Box<dyn Fn(&anyhow::Error) + Send + Sync>>,
    pending: AtomicUsize,
}

impl<A, R> Mutation<A, R>
where
    A: Send + 'static,
    R: Send + 'static,
{
    pub fn new<F, Fut>(client: &QueryClient, run: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        Self {
            client: client.clone(),
            run: Box::new(move |args| run(args).boxed()),
            affects: Box::new(|_| vec![]),
            on_success: None,
            on_error: None,
            pending: AtomicUsize::new(0),
        }
    }

    /// Declares the entities a call with these arguments writes.
    #[must_use]
    pub fn affects(
        mut self,
        affects: impl Fn(&A) -> Vec<Change> + Send + Sync + 'static,
    ) -> Self {
        self.affects = Box::new(affects);
        self
    }

    #[must_use]
    pub fn on_success(mut self, callback: impl Fn(&R) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_error(
        mut self,
        callback: impl Fn(&anyhow::Error) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub async fn mutate(&self, args: A) -> Result<R> {
        let changes = (self.affects)(&args);

        let result = {
            let _pending = PendingGuard::new(&self.pending);
            (self.run)(args).await
        };

        match result {
            Ok(output) => {
                for change in &changes {
                    self.client.invalidate_change(change);
                }

                if let Some(on_success) = &self.on_success {
                    on_success(&output);
                }

                Ok(output)
            }
            Err(error) => {
                if let Some(on_error) = &self.on_error {
                    on_error(&error);
                }

                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::anyhow;

    use super::*;
    use crate::query::deps::{project_key, projects_key};
    use crate::query::ReadOptions;

    #[tokio::test]
    async fn test_success_invalidates_dependents() {
        let client = QueryClient::new();
        client
            .read(
                projects_key("u1"),
                || async { Ok(vec![1i64]) },
                ReadOptions::default(),
            )
            .await;
        client
            .read(
                project_key(1),
                || async { Ok(1i64) },
                ReadOptions::default(),
            )
            .await;

        let succeeded = Arc::new(AtomicUsize::new(0));
        let counter = succeeded.clone();

        let deploy = Mutation::new(&client, |id: i64| async move { Ok(id) })
            .affects(|id| vec![Change::project("u1", *id)])
            .on_success(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(deploy.mutate(1).await.unwrap(), 1);
        assert!(!deploy.is_pending());
        assert_eq!(succeeded.load(Ordering::SeqCst), 1);
        assert!(client.snapshot::<Vec<i64>>(&projects_key("u1")).is_stale);
        assert!(client.snapshot::<i64>(&project_key(1)).is_stale);
    }

    #[tokio::test]
    async fn test_failure_leaves_cache_untouched() {
        let client = QueryClient::new();
        client
            .read(
                projects_key("u1"),
                || async { Ok(vec![1i64]) },
                ReadOptions::default(),
            )
            .await;

        let errors = Arc::new(AtomicUsize::new(0));
        let counter = errors.clone();

        let delete = Mutation::new(&client, |_id: i64| async move {
            Err::<(), _>(anyhow!("permission denied for table projects"))
        })
        .affects(|id| vec![Change::project("u1", *id)])
        .on_error(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let error = delete.mutate(1).await.unwrap_err();

        assert_eq!(error.to_string(), "permission denied for table projects");
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert!(!client.snapshot::<Vec<i64>>(&projects_key("u1")).is_stale);
    }

    #[tokio::test]
    async fn test_pending_while_in_flight_and_after_cancel() {
        let client = QueryClient::new();

        let slow = Mutation::new(&client, |_: ()| async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        });

        let seen_pending = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            slow.is_pending()
        };
        let cancelled = tokio::time::timeout(Duration::from_millis(20), slow.mutate(()));

        let (pending, result) = tokio::join!(seen_pending, cancelled);

        assert!(pending);
        assert!(result.is_err());
        assert!(!slow.is_pending());
    }
}
