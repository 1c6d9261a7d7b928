// ── Data-fetch primitives ──
//
// Reusable request patterns with loading/error bookkeeping: a single
// resource, a fan-out over several endpoints, and a mutation with optional
// optimistic rollback. Every holder publishes its state through a `watch`
// channel and moves `idle -> loading -> idle` per call.

mod multi;
mod mutation;
mod resource;

use std::sync::Arc;

use sharename_api::Error;
use tokio::sync::watch;

pub use multi::{MultiResource, MultiState};
pub use mutation::{Mutation, MutationState, Optimistic, OptimisticUpdate};
pub use resource::{FetchState, Resource};

/// A failure kept in published state. Shared because every subscriber
/// and the caller may hold it at once.
pub type SharedError = Arc<Error>;

type SuccessCallback<T> = Box<dyn Fn(&T) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&Error) + Send + Sync>;

/// State that carries an in-flight flag.
trait Loading {
    fn is_loading(&self) -> bool;
    fn set_loading(&mut self, loading: bool);
}

/// Clears `loading` on drop, so a call that is cancelled mid-request or
/// unwinds out of a callback still ends idle.
struct LoadingGuard<'a, S: Loading> {
    state: &'a watch::Sender<S>,
}

impl<'a, S: Loading> LoadingGuard<'a, S> {
    /// Mark `state` loading and apply `reset` in the same update.
    fn start(state: &'a watch::Sender<S>, reset: impl FnOnce(&mut S)) -> Self {
        state.send_modify(|s| {
            s.set_loading(true);
            reset(s);
        });
        Self { state }
    }
}

impl<S: Loading> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| {
            let was_loading = s.is_loading();
            s.set_loading(false);
            was_loading
        });
    }
}
