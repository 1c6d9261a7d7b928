// Authenticated request pipeline
//
// Wraps `reqwest::Client` with bearer-credential injection, response
// normalization, and failure classification. Endpoint modules (contexts,
// codes, consent, ...) are inherent methods in separate files so this module
// stays focused on transport mechanics.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::envelope::{self, Payload};
use crate::error::{Error, ErrorInfo};
use crate::session::{SessionEvent, SessionKey, SessionStore};
use crate::transport::TransportConfig;

/// Endpoints that never receive an `Authorization` header.
pub const PUBLIC_ENDPOINTS: [&str; 3] = ["register/", "token/", "token/refresh/"];

const EVENT_CHANNEL_SIZE: usize = 16;

/// Whether a URL path targets one of the [`PUBLIC_ENDPOINTS`].
///
/// Matches whole trailing path segments, so `/api/token/` is public while
/// `/api/contexts/` is not.
pub fn is_public_endpoint(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    PUBLIC_ENDPOINTS.iter().any(|endpoint| {
        path == *endpoint
            || path
                .strip_suffix(endpoint)
                .is_some_and(|prefix| prefix.ends_with('/'))
    })
}

/// What the outgoing phase decided about one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    /// Matched the public allow-list, so no credentials were attached.
    pub public: bool,
}

/// A successful exchange: status plus the decoded body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub payload: Payload,
}

impl ApiResponse {
    pub fn data(&self) -> &Value {
        self.payload.data()
    }

    pub fn into_data(self) -> Value {
        self.payload.into_data()
    }

    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, Error> {
        self.payload.deserialize_data()
    }

    /// Decode the data as a list; a non-list body yields an empty list.
    pub fn into_list<T: DeserializeOwned>(self) -> Result<Vec<T>, Error> {
        let items = self.payload.into_array_data(Vec::new());
        Payload::Legacy(Value::Array(items)).deserialize_data()
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the sharename API.
///
/// Cheaply cloneable. Every clone shares the HTTP connection pool, the
/// injected session store, and the session event channel.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL (e.g. `https://sharename.example/api/`) and a
    /// transport config.
    pub fn new(
        base_url: &str,
        session: Arc<dyn SessionStore>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self::with_client(http, base_url, session))
    }

    /// Wrap an existing `reqwest::Client`. The caller owns its timeout and
    /// default headers.
    pub fn with_client(http: reqwest::Client, base_url: Url, session: Arc<dyn SessionStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                session,
                events,
            }),
        }
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn session(&self) -> &dyn SessionStore {
        self.inner.session.as_ref()
    }

    /// Subscribe to session lifecycle signals (expiry, sign-in, sign-out).
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No subscribers is fine; the signal is advisory.
        let _ = self.inner.events.send(event);
    }

    /// Resolve a relative endpoint path (e.g. `"contexts/12/"`) against the base.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Resolve `prefix` and append `segment` as one percent-encoded path
    /// segment plus a trailing slash. Use for user-supplied identifiers.
    pub fn url_with_segment(&self, prefix: &str, segment: &str) -> Result<Url, Error> {
        push_segment(self.url(prefix)?, segment)
    }

    // ── Outgoing phase ───────────────────────────────────────────────

    /// Describe a request and attach credentials when it is not public.
    fn prepare(&self, method: Method, path: &str) -> Result<(RequestDescriptor, RequestBuilder), Error> {
        let url = self.url(path)?;
        let public = is_public_endpoint(url.path());
        let descriptor = RequestDescriptor {
            method: method.clone(),
            url: url.clone(),
            public,
        };

        let mut builder = self.inner.http.request(method, url);
        if !public {
            if let Some(token) = self.inner.session.get(SessionKey::Access) {
                match HeaderValue::from_str(&format!("Bearer {token}")) {
                    Ok(mut value) => {
                        value.set_sensitive(true);
                        builder = builder.header(AUTHORIZATION, value);
                    }
                    Err(e) => warn!(error = %e, "stored access token is not a valid header value"),
                }
            }
        }
        Ok((descriptor, builder))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        attach: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<ApiResponse, Error> {
        let (descriptor, builder) = self.prepare(method, path)?;
        debug!(
            method = %descriptor.method,
            url = %descriptor.url,
            public = descriptor.public,
            "sending request"
        );

        match attach(builder).send().await {
            Ok(resp) => self.handle_response(&descriptor, resp).await,
            Err(e) => Err(transport_failure(&descriptor, e)),
        }
    }

    // ── Incoming phase ───────────────────────────────────────────────

    async fn handle_response(
        &self,
        descriptor: &RequestDescriptor,
        resp: reqwest::Response,
    ) -> Result<ApiResponse, Error> {
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| transport_failure(descriptor, e))?;
        let body = parse_body(&text);

        if status.is_success() {
            let payload = Payload::decode(body.unwrap_or(Value::Null));
            let payload = match payload {
                Payload::Legacy(ref value) if envelope::looks_like_legacy_failure(value) => {
                    trace!(url = %descriptor.url, "normalizing legacy payload");
                    Payload::Standardized(payload.normalize())
                }
                other => other,
            };
            return Ok(ApiResponse {
                status: status.as_u16(),
                payload,
            });
        }

        Err(self.handle_failure(descriptor, status, body))
    }

    fn handle_failure(
        &self,
        descriptor: &RequestDescriptor,
        status: StatusCode,
        body: Option<Value>,
    ) -> Error {
        let info = ErrorInfo::classify(Some(status.as_u16()), body.as_ref());
        warn!(
            method = %descriptor.method,
            url = %descriptor.url,
            status = status.as_u16(),
            message = %info.message,
            "request failed"
        );

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session(descriptor);
            return Error::SessionExpired { info };
        }

        Error::Http {
            status: status.as_u16(),
            info,
            body,
        }
    }

    /// Clear stored credentials and tell the host. Safe to run repeatedly.
    fn expire_session(&self, descriptor: &RequestDescriptor) {
        if let Err(e) = self.inner.session.clear() {
            warn!(error = %e, "failed to clear session after 401");
        } else {
            info!(url = %descriptor.url, "session cleared after 401");
        }
        self.emit(SessionEvent::Expired {
            url: descriptor.url.to_string(),
        });
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get(&self, path: &str) -> Result<ApiResponse, Error> {
        self.send(Method::GET, path, |b| b).await
    }

    pub async fn get_with_params(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, Error> {
        self.send(Method::GET, path, |b| b.query(params)).await
    }

    pub async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<ApiResponse, Error> {
        self.send(Method::POST, path, |b| b.json(body)).await
    }

    /// POST with no request body.
    pub async fn post_empty(&self, path: &str) -> Result<ApiResponse, Error> {
        self.send(Method::POST, path, |b| b).await
    }

    pub async fn patch<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<ApiResponse, Error> {
        self.send(Method::PATCH, path, |b| b.json(body)).await
    }

    /// PATCH a `multipart/form-data` body, for file uploads.
    pub async fn patch_multipart(&self, path: &str, form: Form) -> Result<ApiResponse, Error> {
        self.send(Method::PATCH, path, |b| b.multipart(form)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, Error> {
        self.send(Method::DELETE, path, |b| b).await
    }

    // ── Typed helpers ────────────────────────────────────────────────

    pub async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.get(path).await?.deserialize()
    }

    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, Error> {
        self.get(path).await?.into_list()
    }

    pub async fn post_data<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.post(path, body).await?.deserialize()
    }

    pub async fn patch_data<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.patch(path, body).await?.deserialize()
    }
}

/// A send/receive error with no HTTP response behind it.
fn transport_failure(descriptor: &RequestDescriptor, source: reqwest::Error) -> Error {
    if source.is_builder() {
        return Error::Transport(source);
    }
    let info = ErrorInfo::network();
    warn!(
        method = %descriptor.method,
        url = %descriptor.url,
        timeout = source.is_timeout(),
        error = %source,
        "no response from server"
    );
    Error::Network { info, source }
}

fn push_segment(mut url: Url, segment: &str) -> Result<Url, Error> {
    url.path_segments_mut()
        .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .push(segment)
        .push("");
    Ok(url)
}

/// Empty bodies decode to `None`; non-JSON text is kept as a JSON string.
fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_endpoint_matching() {
        assert!(is_public_endpoint("/api/token/"));
        assert!(is_public_endpoint("/api/token/refresh/"));
        assert!(is_public_endpoint("/api/register/"));
        assert!(is_public_endpoint("token/"));
        assert!(is_public_endpoint("/api/register/?next=x"));

        assert!(!is_public_endpoint("/api/contexts/"));
        assert!(!is_public_endpoint("/api/profile/"));
        assert!(!is_public_endpoint("/api/mytoken/"));
        assert!(!is_public_endpoint("/api/token"));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = ApiClient::normalize_base_url("https://example.test/api").expect("url");
        assert_eq!(url.as_str(), "https://example.test/api/");
        assert_eq!(
            url.join("contexts/").expect("join").as_str(),
            "https://example.test/api/contexts/"
        );
    }

    #[test]
    fn segments_cannot_escape_their_prefix() {
        let base = ApiClient::normalize_base_url("https://example.test/api").expect("url");
        let prefix = base.join("codes/").expect("join");

        let url = push_segment(prefix.clone(), "AB12CD").expect("segment");
        assert_eq!(url.as_str(), "https://example.test/api/codes/AB12CD/");

        let url = push_segment(prefix.clone(), "../contexts").expect("segment");
        assert_eq!(url.path(), "/api/codes/..%2Fcontexts/");

        let url = push_segment(prefix, "a b?c#d").expect("segment");
        assert_eq!(url.path(), "/api/codes/a%20b%3Fc%23d/");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn body_parsing() {
        assert_eq!(parse_body(""), None);
        assert_eq!(parse_body("  "), None);
        assert_eq!(parse_body("{\"a\":1}"), Some(serde_json::json!({"a": 1})));
        assert_eq!(
            parse_body("<html>oops</html>"),
            Some(Value::String("<html>oops</html>".into()))
        );
    }
}
