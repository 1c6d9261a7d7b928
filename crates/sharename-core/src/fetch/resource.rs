// ── Single-resource fetch ──

use serde::de::DeserializeOwned;
use sharename_api::ApiClient;
use tokio::sync::watch;
use tracing::debug;

use super::{ErrorCallback, Loading, LoadingGuard, SharedError, SuccessCallback};

/// Snapshot of a [`Resource`].
#[derive(Debug, Clone)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<SharedError>,
}

impl<T> Loading for FetchState<T> {
    fn is_loading(&self) -> bool {
        self.loading
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// One endpoint's data, decoded into `T`, with loading and error state.
///
/// Fetch failures are stored, not returned: a failed fetch leaves the
/// previous data in place and records the error.
pub struct Resource<T> {
    client: ApiClient,
    endpoint: Option<String>,
    state: watch::Sender<FetchState<T>>,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T> Resource<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(client: ApiClient, endpoint: impl Into<String>) -> Self {
        Self::build(client, Some(endpoint.into()))
    }

    /// A resource with nothing to fetch yet. `fetch_data` is a no-op
    /// until an endpoint is set.
    pub fn detached(client: ApiClient) -> Self {
        Self::build(client, None)
    }

    fn build(client: ApiClient, endpoint: Option<String>) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            client,
            endpoint,
            state,
            on_success: None,
            on_error: None,
        }
    }

    #[must_use]
    pub fn with_initial_data(self, data: T) -> Self {
        self.state.send_modify(|s| s.data = Some(data));
        self
    }

    #[must_use]
    pub fn on_success(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&sharename_api::Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = Some(endpoint.into());
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// GET the endpoint and store the decoded data or the error.
    /// Safe to call again at any time.
    pub async fn fetch_data(&self) {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return;
        };

        let _loading = LoadingGuard::start(&self.state, |s| s.error = None);
        debug!(endpoint, "fetching resource");

        match self.client.get_data::<T>(endpoint).await {
            Ok(data) => {
                self.state.send_modify(|s| {
                    s.data = Some(data.clone());
                    s.loading = false;
                });
                if let Some(cb) = &self.on_success {
                    cb(&data);
                }
            }
            Err(e) => {
                let e = SharedError::new(e);
                self.state.send_modify(|s| {
                    s.error = Some(e.clone());
                    s.loading = false;
                });
                if let Some(cb) = &self.on_error {
                    cb(&e);
                }
            }
        }
    }

    pub async fn refetch(&self) {
        self.fetch_data().await;
    }

    /// Replace the data locally, without a request.
    pub fn update_data(&self, data: T) {
        self.state.send_modify(|s| s.data = Some(data));
    }

    pub fn state(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.state.borrow().data.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }
}
