// ── Session-expiry guard ──
//
// Turns the pipeline's `SessionEvent::Expired` signal into navigation.
// The host supplies the navigation primitive through `Navigator`.

use std::sync::Arc;

use sharename_api::SessionEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";

/// Host-side navigation.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    /// Leave the current screen for `path`, discarding in-memory state.
    fn navigate(&self, path: &str);
}

#[derive(Clone)]
pub struct SessionGuard {
    navigator: Arc<dyn Navigator>,
}

impl SessionGuard {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    /// React to one event. Returns whether a navigation happened.
    pub fn handle(&self, event: &SessionEvent) -> bool {
        let SessionEvent::Expired { url } = event else {
            return false;
        };

        let current = self.navigator.current_path();
        if current.contains(LOGIN_PATH) || current.contains(SIGNUP_PATH) {
            debug!(%current, "session expired on an auth screen, staying put");
            return false;
        }

        info!(%url, from = %current, "session expired, redirecting to login");
        self.navigator.navigate(LOGIN_PATH);
        true
    }

    /// Drive the guard from a session event channel until `cancel` fires
    /// or the channel closes.
    pub fn spawn(
        self,
        mut events: broadcast::Receiver<SessionEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(event) => {
                            self.handle(&event);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "session guard lagged behind");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct FakeNavigator {
        path: Mutex<String>,
        visits: Mutex<Vec<String>>,
    }

    impl FakeNavigator {
        fn at(path: &str) -> Arc<Self> {
            Arc::new(Self {
                path: Mutex::new(path.into()),
                visits: Mutex::new(Vec::new()),
            })
        }
    }

    impl Navigator for FakeNavigator {
        fn current_path(&self) -> String {
            self.path.lock().unwrap().clone()
        }

        fn navigate(&self, path: &str) {
            self.visits.lock().unwrap().push(path.into());
            *self.path.lock().unwrap() = path.into();
        }
    }

    fn expired() -> SessionEvent {
        SessionEvent::Expired {
            url: "http://api.test/api/contexts/".into(),
        }
    }

    #[test]
    fn redirects_once_from_protected_screen() {
        let nav = FakeNavigator::at("/dashboard");
        let guard = SessionGuard::new(nav.clone());

        assert!(guard.handle(&expired()));
        assert_eq!(*nav.visits.lock().unwrap(), vec!["/login".to_string()]);

        // Already on the login screen: the second 401 does nothing.
        assert!(!guard.handle(&expired()));
        assert_eq!(nav.visits.lock().unwrap().len(), 1);
    }

    #[test]
    fn stays_on_auth_screens() {
        for path in ["/login", "/login?next=/dashboard", "/signup"] {
            let nav = FakeNavigator::at(path);
            assert!(!SessionGuard::new(nav.clone()).handle(&expired()));
            assert!(nav.visits.lock().unwrap().is_empty());
        }
    }

    #[test]
    fn ignores_other_events() {
        let nav = FakeNavigator::at("/dashboard");
        let guard = SessionGuard::new(nav.clone());
        assert!(!guard.handle(&SessionEvent::SignedOut));
        assert!(nav.visits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn spawned_guard_drains_channel_until_closed() {
        let nav = FakeNavigator::at("/company");
        let (tx, rx) = broadcast::channel(4);
        let handle = SessionGuard::new(nav.clone()).spawn(rx, CancellationToken::new());

        tx.send(expired()).unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(*nav.visits.lock().unwrap(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn spawned_guard_stops_on_cancel() {
        let nav = FakeNavigator::at("/company");
        let (_tx, rx) = broadcast::channel::<SessionEvent>(4);
        let cancel = CancellationToken::new();
        let handle = SessionGuard::new(nav.clone()).spawn(rx, cancel.clone());

        cancel.cancel();
        handle.await.unwrap();
        assert!(nav.visits.lock().unwrap().is_empty());
    }
}
