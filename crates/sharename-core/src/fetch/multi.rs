// ── Multi-resource fetch ──
//
// Fan-out over a keyed set of endpoints. All requests run concurrently and
// are partitioned once every one has settled.

use futures_util::future::join_all;
use indexmap::IndexMap;
use sharename_api::{ApiClient, Payload};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{Loading, LoadingGuard, SharedError};

/// Snapshot of a [`MultiResource`]. A key appears in exactly one of
/// `data` or `errors` after a fetch.
#[derive(Debug, Clone, Default)]
pub struct MultiState {
    pub data: IndexMap<String, Payload>,
    pub errors: IndexMap<String, SharedError>,
    pub loading: bool,
}

impl Loading for MultiState {
    fn is_loading(&self) -> bool {
        self.loading
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

impl MultiState {
    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.data.get(key)
    }

    pub fn error(&self, key: &str) -> Option<&SharedError> {
        self.errors.get(key)
    }

    /// Decode one key's data as a list. Missing keys, failed keys, and
    /// undecodable data all yield an empty list.
    pub fn list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(payload) = self.data.get(key) else {
            return Vec::new();
        };
        payload
            .array_data()
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect()
    }

    /// Decode one key's data as a single value.
    pub fn item<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.data.get(key)?;
        serde_json::from_value(payload.data().clone()).ok()
    }
}

pub struct MultiResource {
    client: ApiClient,
    endpoints: IndexMap<String, String>,
    state: watch::Sender<MultiState>,
}

impl MultiResource {
    pub fn new<K, V>(client: ApiClient, endpoints: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let endpoints = endpoints
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let (state, _) = watch::channel(MultiState::default());
        Self {
            client,
            endpoints,
            state,
        }
    }

    pub fn endpoints(&self) -> &IndexMap<String, String> {
        &self.endpoints
    }

    /// GET every endpoint concurrently and partition the outcomes.
    /// Never fails; per-key errors land in [`MultiState::errors`].
    pub async fn fetch_all(&self) -> MultiState {
        let _loading = LoadingGuard::start(&self.state, |s| s.errors.clear());
        debug!(count = self.endpoints.len(), "fetching resources");

        let results = join_all(self.endpoints.iter().map(|(key, endpoint)| async move {
            (key.clone(), self.client.get(endpoint).await)
        }))
        .await;

        let mut data = IndexMap::new();
        let mut errors = IndexMap::new();
        for (key, result) in results {
            match result {
                Ok(resp) => {
                    data.insert(key, resp.payload);
                }
                Err(e) => {
                    warn!(key, error = %e, "resource fetch failed");
                    errors.insert(key, SharedError::new(e));
                }
            }
        }

        self.state.send_modify(|s| {
            s.data = data;
            s.errors = errors;
            s.loading = false;
        });
        self.state()
    }

    pub async fn refetch(&self) -> MultiState {
        self.fetch_all().await
    }

    /// Replace all data locally, without requests.
    pub fn update_data(&self, data: IndexMap<String, Payload>) {
        self.state.send_modify(|s| s.data = data);
    }

    pub fn state(&self) -> MultiState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MultiState> {
        self.state.subscribe()
    }
}
