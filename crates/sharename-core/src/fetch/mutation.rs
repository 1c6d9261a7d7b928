// ── Mutation with optimistic rollback ──

use std::future::Future;

use sharename_api::Error;
use tokio::sync::watch;
use tracing::debug;

use super::{ErrorCallback, Loading, LoadingGuard, SharedError, SuccessCallback};

/// A local state change applied before a write and undone if it fails.
pub trait OptimisticUpdate: Send + Sync {
    fn apply(&self);
    fn revert(&self);
}

/// [`OptimisticUpdate`] from a pair of closures.
pub struct Optimistic<A, R> {
    apply: A,
    revert: R,
}

impl<A, R> Optimistic<A, R>
where
    A: Fn() + Send + Sync,
    R: Fn() + Send + Sync,
{
    pub fn new(apply: A, revert: R) -> Self {
        Self { apply, revert }
    }
}

impl<A, R> OptimisticUpdate for Optimistic<A, R>
where
    A: Fn() + Send + Sync,
    R: Fn() + Send + Sync,
{
    fn apply(&self) {
        (self.apply)();
    }

    fn revert(&self) {
        (self.revert)();
    }
}

#[derive(Debug, Clone, Default)]
pub struct MutationState {
    pub loading: bool,
    pub error: Option<SharedError>,
}

impl Loading for MutationState {
    fn is_loading(&self) -> bool {
        self.loading
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

/// Runs caller-supplied writes producing `T` with loading/error tracking.
pub struct Mutation<T = ()> {
    state: watch::Sender<MutationState>,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T> Default for Mutation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mutation<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(MutationState::default());
        Self {
            state,
            on_success: None,
            on_error: None,
        }
    }

    #[must_use]
    pub fn on_success(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Run `request`. With `optimistic`, `apply` runs first and `revert`
    /// runs before a failure is handed back.
    pub async fn mutate<F, Fut>(
        &self,
        request: F,
        optimistic: Option<&dyn OptimisticUpdate>,
    ) -> Result<T, SharedError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let _loading = LoadingGuard::start(&self.state, |s| s.error = None);

        if let Some(update) = optimistic {
            update.apply();
        }

        match request().await {
            Ok(value) => {
                self.state.send_modify(|s| s.loading = false);
                if let Some(cb) = &self.on_success {
                    cb(&value);
                }
                Ok(value)
            }
            Err(e) => {
                if let Some(update) = optimistic {
                    debug!(error = %e, "write failed, reverting optimistic update");
                    update.revert();
                }
                let e = SharedError::new(e);
                self.state.send_modify(|s| {
                    s.error = Some(e.clone());
                    s.loading = false;
                });
                if let Some(cb) = &self.on_error {
                    cb(&e);
                }
                Err(e)
            }
        }
    }

    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::{Arc, Mutex};

    use sharename_api::ErrorInfo;

    use super::*;

    fn rejected() -> Error {
        Error::Http {
            status: 409,
            info: ErrorInfo::classify(Some(409), None),
            body: None,
        }
    }

    #[tokio::test]
    async fn failed_write_reverts_and_propagates() {
        let value = Arc::new(AtomicI32::new(1));
        let (a, r) = (value.clone(), value.clone());
        let update = Optimistic::new(move || a.store(2, Ordering::SeqCst), move || {
            r.store(1, Ordering::SeqCst);
        });

        let mutation = Mutation::new();
        let result: Result<(), _> = mutation
            .mutate(|| async { Err(rejected()) }, Some(&update))
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(value.load(Ordering::SeqCst), 1);
        let state = mutation.state();
        assert!(!state.loading);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn successful_write_keeps_optimistic_state() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, r) = (log.clone(), log.clone());
        let update = Optimistic::new(
            move || a.lock().unwrap().push("apply"),
            move || r.lock().unwrap().push("revert"),
        );

        let mutation = Mutation::new();
        let out = mutation
            .mutate(|| async { Ok::<_, Error>(7) }, Some(&update))
            .await
            .unwrap();

        assert_eq!(out, 7);
        assert_eq!(*log.lock().unwrap(), vec!["apply"]);
        assert!(mutation.state().error.is_none());
    }

    #[tokio::test]
    async fn error_callback_sees_failure() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let mutation = Mutation::new().on_error(move |e| {
            *sink.lock().unwrap() = Some(e.user_message());
        });

        let _ = mutation
            .mutate(|| async { Err::<(), _>(rejected()) }, None)
            .await;
        assert_eq!(
            seen.lock().unwrap().as_deref(),
            Some(sharename_api::error::CONFLICT_MESSAGE)
        );
    }

    #[tokio::test]
    async fn success_callback_runs_once_idle() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let watcher = Arc::new(Mutex::new(None::<watch::Receiver<MutationState>>));
        let rx_slot = watcher.clone();

        let m = Mutation::new().on_success(move |v: &i32| {
            let loading = rx_slot.lock().unwrap().as_ref().map(|rx| rx.borrow().loading);
            *sink.lock().unwrap() = Some((*v, loading));
        });
        *watcher.lock().unwrap() = Some(m.subscribe());

        m.mutate(|| async { Ok::<_, Error>(3) }, None).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), Some((3, Some(false))));
    }

    #[tokio::test]
    async fn dropped_write_leaves_state_idle() {
        let mutation: Mutation<()> = Mutation::new();
        let pending = mutation.mutate(
            || async {
                std::future::pending::<()>().await;
                Ok(())
            },
            None,
        );

        let outcome = tokio::time::timeout(std::time::Duration::from_millis(20), pending).await;
        assert!(outcome.is_err());
        assert!(!mutation.state().loading);
    }
}
