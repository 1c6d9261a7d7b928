#![allow(clippy::unwrap_used)]
// Integration tests for the request pipeline and typed endpoints using wiremock.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sharename_api::error::{NETWORK_ERROR_MESSAGE, SERVER_ERROR_MESSAGE, UNAUTHORIZED_MESSAGE};
use sharename_api::models::{ConsentStatus, ContextInput, PersonalDetails, ProfilePicture};
use sharename_api::{
    ApiClient, ConsentRequired, Error, MemorySessionStore, Role, SessionEvent, SessionKey,
    SessionStore, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient, Arc<MemorySessionStore>) {
    let server = MockServer::start().await;
    let store = Arc::new(MemorySessionStore::new());
    let base_url = Url::parse(&format!("{}/api/", server.uri())).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url, store.clone());
    (server, client, store)
}

fn sign_in(store: &MemorySessionStore) {
    store.set(SessionKey::Access, "access-1").unwrap();
    store.set(SessionKey::Refresh, "refresh-1").unwrap();
    store.set(SessionKey::Role, "individual").unwrap();
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({
        "success": true,
        "data": data,
        "message": "ok",
        "timestamp": "2024-01-01T00:00:00Z"
    })
}

// ── Credentials ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_then_profile_carries_stored_token() {
    let (server, client, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({"email": "ada@x.test", "password": "hunter22"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({"access": "tok-A", "refresh": "tok-R"}))),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .and(header("authorization", "Bearer tok-A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 1, "email": "ada@x.test", "role": "company"
        }))))
        .expect(2)
        .mount(&server)
        .await;

    let mut events = client.subscribe();
    let password: SecretString = "hunter22".to_string().into();
    let role = client.login("ada@x.test", &password).await.unwrap();

    assert_eq!(role, Role::Company);
    assert_eq!(store.get(SessionKey::Access).as_deref(), Some("tok-A"));
    assert_eq!(store.get(SessionKey::Refresh).as_deref(), Some("tok-R"));
    assert_eq!(store.get(SessionKey::Role).as_deref(), Some("company"));
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::SignedIn {
            role: Role::Company
        }
    );

    let profile = client.my_profile().await.unwrap();
    assert_eq!(profile.email, "ada@x.test");
}

#[tokio::test]
async fn test_login_defaults_role_when_profile_fails() {
    let (server, client, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a", "refresh": "r"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let password: SecretString = "pw".to_string().into();
    let role = client.login("a@x.test", &password).await.unwrap();
    assert_eq!(role, Role::Individual);
    assert_eq!(store.get(SessionKey::Role).as_deref(), Some("individual"));
}

#[tokio::test]
async fn test_public_endpoints_never_carry_credentials() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-2"})))
        .mount(&server)
        .await;

    client.refresh_token().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
    assert_eq!(store.get(SessionKey::Access).as_deref(), Some("access-2"));
    assert_eq!(store.get(SessionKey::Refresh).as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_refresh_without_token_fails_locally() {
    let (server, client, _store) = setup().await;
    let result = client.refresh_token().await;
    assert!(matches!(result, Err(Error::MissingToken("refresh"))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Session expiry ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_clears_session_and_signals() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("GET"))
        .and(path("/api/contexts/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Given token not valid for any token type"})),
        )
        .mount(&server)
        .await;

    let mut events = client.subscribe();
    let err = client.list_contexts().await.unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(err.user_message(), UNAUTHORIZED_MESSAGE);
    assert!(store.is_empty());
    match events.try_recv().unwrap() {
        SessionEvent::Expired { url } => assert!(url.ends_with("/api/contexts/")),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_other_failures_leave_session_alone() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("GET"))
        .and(path("/api/redemptions/"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "down"})))
        .mount(&server)
        .await;

    let mut events = client.subscribe();
    let err = client.list_redemptions().await.unwrap_err();

    assert!(err.is_server_error());
    assert_eq!(err.user_message(), SERVER_ERROR_MESSAGE);
    assert_eq!(store.get(SessionKey::Access).as_deref(), Some("access-1"));
    assert!(events.try_recv().is_err());
}

// ── Classification ──────────────────────────────────────────────────

#[tokio::test]
async fn test_bad_request_surfaces_first_field_message() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("POST"))
        .and(path("/api/contexts/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"label": ["too short"]})))
        .mount(&server)
        .await;

    let input = ContextInput {
        label: Some("x".into()),
        ..ContextInput::default()
    };
    let err = client.create_context(&input).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "too short");
    assert_eq!(err.field_errors()["label"], "too short");
}

#[tokio::test]
async fn test_offline_is_a_network_error() {
    let store = Arc::new(MemorySessionStore::new());
    let client = ApiClient::new("http://127.0.0.1:1/api", store, &TransportConfig::default())
        .unwrap();

    let err = client.list_notifications().await.unwrap_err();
    assert!(err.is_network_error());
    assert_eq!(err.status(), None);
    assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_timeout_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let transport = TransportConfig::default().with_timeout(Duration::from_millis(50));
    let client = ApiClient::new(
        &format!("{}/api", server.uri()),
        Arc::new(MemorySessionStore::new()),
        &transport,
    )
    .unwrap();

    let err = client.list_notifications().await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
}

// ── Response shapes ─────────────────────────────────────────────────

#[tokio::test]
async fn test_legacy_and_standardized_lists_decode_alike() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("GET"))
        .and(path("/api/contexts/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "label": "Work"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/contexts/archived/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!([{"id": 2, "label": "Old", "archived": true}]))),
        )
        .mount(&server)
        .await;

    let live = client.list_contexts().await.unwrap();
    let archived = client.list_archived_contexts().await.unwrap();
    assert_eq!(live[0].label, "Work");
    assert_eq!(archived[0].id, 2);
    assert!(archived[0].archived);
}

#[tokio::test]
async fn test_legacy_success_body_is_normalized() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("POST"))
        .and(path("/api/revoke-access/"))
        .and(body_json(json!({"audit_id": 9})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Access revoked successfully"})),
        )
        .mount(&server)
        .await;

    let resp = client
        .post("revoke-access/", &json!({"audit_id": 9}))
        .await
        .unwrap();
    assert!(resp.payload.is_standardized());
    assert_eq!(resp.data()["message"], "Access revoked successfully");

    let ack = client.revoke_access(9).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Access revoked successfully"));
}

#[tokio::test]
async fn test_envelope_with_falsy_timestamp_is_not_wrapped_again() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    let body = json!({"success": false, "timestamp": null, "data": {"id": 5}});
    Mock::given(method("GET"))
        .and(path("/api/contexts/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let resp = client.get("contexts/5/").await.unwrap();
    assert!(resp.payload.is_standardized());
    assert_eq!(resp.data(), &json!({"id": 5}));
    assert_eq!(sharename_api::envelope::extract_data(&body), resp.data());
}

#[tokio::test]
async fn test_non_list_data_yields_empty_list() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("GET"))
        .and(path("/api/notifications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .mount(&server)
        .await;

    assert!(client.list_notifications().await.unwrap().is_empty());
}

// ── Endpoints ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_redeem_consent_gate() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("GET"))
        .and(path("/api/codes/ABC123/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "message": "This context requires consent. You need to request access first.",
            "errors": {"requires_consent": true, "context_label": "Work", "owner": "o@x.test"},
            "timestamp": "2024-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let err = client.redeem_code(" ABC123 ").await.unwrap_err();
    let gate = ConsentRequired::from_error(&err).unwrap();
    assert_eq!(gate.owner.as_deref(), Some("o@x.test"));
}

#[tokio::test]
async fn test_redeem_code_stays_under_codes() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("GET"))
        .and(path("/api/contexts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.redeem_code("../contexts").await.unwrap_err();
    assert!(err.is_not_found());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/api/codes/..%2Fcontexts/");
}

#[tokio::test]
async fn test_profile_picture_upload_is_multipart() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("PATCH"))
        .and(path("/api/personal-details/"))
        .and(header("authorization", "Bearer access-1"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"first_name\""))
        .and(body_string_contains("filename=\"me.png\""))
        .and(body_string_contains("Content-Type: image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "first_name": "Ana",
            "profile_picture": "/media/profile_pictures/me.png",
            "profile_completed": true
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let details = PersonalDetails {
        first_name: Some("Ana".into()),
        bio: Some(String::new()),
        ..PersonalDetails::default()
    };
    let picture = ProfilePicture {
        file_name: "me.png".into(),
        bytes: b"PNG image bytes".to_vec(),
    };
    let updated = client
        .update_personal_details_with_picture(&details, picture)
        .await
        .unwrap();

    assert!(updated.profile_completed);
    assert_eq!(
        updated.profile_picture.as_deref(),
        Some("/media/profile_pictures/me.png")
    );

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("name=\"bio\""));
}

#[tokio::test]
async fn test_update_consent_request_sends_status() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("PATCH"))
        .and(path("/api/consent-requests/5/"))
        .and(body_json(json!({"status": "approved"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 5, "context_label": "Work", "status": "approved"
        }))))
        .mount(&server)
        .await;

    let updated = client
        .update_consent_request(5, ConsentStatus::Approved)
        .await
        .unwrap();
    assert_eq!(updated.status, ConsentStatus::Approved);
}

#[tokio::test]
async fn test_mark_all_notifications_read_patches_unread_only() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("GET"))
        .and(path("/api/notifications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "type": "redemption", "read": false},
            {"id": 2, "type": "redemption", "read": true},
            {"id": 3, "type": "consent_request", "read": false}
        ])))
        .mount(&server)
        .await;
    for id in [1, 3] {
        Mock::given(method("PATCH"))
            .and(path(format!("/api/notifications/{id}/")))
            .and(body_json(json!({"read": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": id, "read": true})))
            .expect(1)
            .mount(&server)
            .await;
    }

    assert_eq!(client.mark_all_notifications_read().await.unwrap(), 2);
}

#[tokio::test]
async fn test_blank_search_skips_request() {
    let (server, client, store) = setup().await;
    sign_in(&store);

    Mock::given(method("GET"))
        .and(path("/api/search/users/"))
        .and(query_param("q", "ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 4, "email": "ada@x.test", "display_name": "Ada", "role": "individual"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.search_users("   ").await.unwrap().is_empty());
    let hits = client.search_users(" ada ").await.unwrap();
    assert_eq!(hits[0].display_name, "Ada");
}
