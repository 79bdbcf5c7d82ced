mod support;

use std::sync::Arc;

use kit_api::auth::events::{ACCESS_TOKEN_OPTION, REFRESH_TOKEN_OPTION, TOKEN_EXPIRES_OPTION};
use kit_api::auth::pkce::CODE_VERIFIER_OPTION;
use kit_api::auth::{
    code_challenge, AuthorizeOptions, Credentials, FileOptionStore, MemoryOptionStore, OptionStore,
    OptionStoreConfig, StoreTokens, TokenEventKind,
};
use kit_api::client::KitClient;
use kit_api::error::{FailureKind, KitError};
use pretty_assertions::assert_eq;
use reqwest::Url;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{config, credentials, token_body, RecordingListener, CLIENT_ID, REDIRECT_URI};

fn client_with_store(server: &MockServer, store: Arc<dyn OptionStore>) -> KitClient {
    KitClient::new(Credentials::new(CLIENT_ID, REDIRECT_URI))
        .with_config(config(server))
        .with_option_store(store)
}

fn query(url: &str, key: &str) -> Option<String> {
    Url::parse(url)
        .expect("valid url")
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[tokio::test]
async fn oauth_url_carries_pkce_challenge_for_stored_verifier() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryOptionStore::new());
    let client = client_with_store(&server, store.clone());

    let url = client.oauth_url(&AuthorizeOptions::default()).expect("oauth url");
    let verifier = store
        .get(CODE_VERIFIER_OPTION)
        .expect("store read")
        .expect("verifier stored");

    assert!(url.starts_with(&format!("{}/oauth/authorize?", server.uri())));
    assert_eq!(query(&url, "client_id").as_deref(), Some(CLIENT_ID));
    assert_eq!(query(&url, "response_type").as_deref(), Some("code"));
    assert_eq!(query(&url, "redirect_uri").as_deref(), Some(REDIRECT_URI));
    assert_eq!(query(&url, "code_challenge"), Some(code_challenge(&verifier)));
    assert_eq!(query(&url, "code_challenge_method").as_deref(), Some("S256"));
    assert_eq!(query(&url, "state"), None);
}

#[tokio::test]
async fn oauth_url_is_stable_until_exchange() {
    let server = MockServer::start().await;
    let client = client_with_store(&server, Arc::new(MemoryOptionStore::new()));

    let first = client.oauth_url(&AuthorizeOptions::default()).expect("first url");
    let second = client.oauth_url(&AuthorizeOptions::default()).expect("second url");
    assert_eq!(first, second);
}

#[tokio::test]
async fn oauth_url_with_return_to_and_tenant() {
    let server = MockServer::start().await;
    let client = client_with_store(&server, Arc::new(MemoryOptionStore::new()));

    let url = client
        .oauth_url(&AuthorizeOptions {
            return_to: Some("https://example.com/wp-admin".to_string()),
            tenant_name: Some("https://example.com".to_string()),
        })
        .expect("oauth url");

    let state = query(&url, "state").expect("state present");
    let decoded = kit_api::auth::pkce::base64_urldecode(&state).expect("state is base64url");
    let state: serde_json::Value = serde_json::from_slice(&decoded).expect("state is json");
    assert_eq!(
        state,
        json!({ "return_to": "https://example.com/wp-admin", "client_id": CLIENT_ID })
    );
    assert_eq!(query(&url, "tenant_name").as_deref(), Some("https://example.com"));
}

#[tokio::test]
async fn code_exchange_stores_tokens_notifies_and_discards_verifier() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryOptionStore::new());
    let listener = RecordingListener::new();
    let client = client_with_store(&server, store.clone()).with_listener(listener.clone());

    let first_url = client.oauth_url(&AuthorizeOptions::default()).expect("oauth url");
    let verifier = client.code_verifier().expect("read").expect("verifier present");

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_json(json!({
            "client_id": CLIENT_ID,
            "grant_type": "authorization_code",
            "code": "auth-code",
            "redirect_uri": REDIRECT_URI,
            "code_verifier": verifier
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-1", "refresh-1")))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = client.get_access_token("auth-code").await.expect("exchange");
    assert_eq!(tokens.access_token, "access-1");
    assert_eq!(client.credentials().access_token(), Some("access-1"));
    assert_eq!(client.credentials().refresh_token(), Some("refresh-1"));

    let events = listener.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, TokenEventKind::Exchanged);
    assert_eq!(events[0].client_id, CLIENT_ID);
    assert_eq!(events[0].tokens.refresh_token, "refresh-1");

    assert_eq!(client.code_verifier().expect("read"), None);
    let next_url = client.oauth_url(&AuthorizeOptions::default()).expect("oauth url");
    assert_ne!(query(&first_url, "code_challenge"), query(&next_url, "code_challenge"));
}

#[tokio::test]
async fn failed_code_exchange_still_discards_verifier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "The provided authorization grant is invalid, expired, revoked, does not match the redirection URI used in the authorization request, or was issued to another client."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryOptionStore::new());
    let listener = RecordingListener::new();
    let client = client_with_store(&server, store.clone()).with_listener(listener.clone());
    client.oauth_url(&AuthorizeOptions::default()).expect("oauth url");

    let err = client.get_access_token("bad-code").await.expect_err("exchange fails");

    assert!(matches!(err, KitError::Client { status: 400, .. }));
    assert!(err.to_string().starts_with("The provided authorization grant is invalid"));
    assert_eq!(store.get(CODE_VERIFIER_OPTION).expect("read"), None);
    assert_eq!(client.credentials().access_token(), None);
    assert!(listener.events().is_empty());
}

#[tokio::test]
async fn refresh_token_replaces_pair_and_emits_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_json(json!({
            "client_id": CLIENT_ID,
            "grant_type": "refresh_token",
            "refresh_token": "refresh-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-2", "refresh-2")))
        .expect(1)
        .mount(&server)
        .await;

    let listener = RecordingListener::new();
    let client = support::client(&server, credentials("access-1", "refresh-1"))
        .with_listener(listener.clone());

    let before = client.credentials();
    let tokens = client.refresh_token().await.expect("refresh");

    assert_eq!(tokens.refresh_token, "refresh-2");
    assert_eq!(before.access_token(), Some("access-1"));
    assert_eq!(client.credentials().access_token(), Some("access-2"));
    assert_eq!(listener.events()[0].kind, TokenEventKind::Refreshed);

    let received = server.received_requests().await.expect("recording enabled");
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn token_response_without_refresh_token_is_unexpected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "only" })))
        .expect(1)
        .mount(&server)
        .await;

    let listener = RecordingListener::new();
    let client = support::client(&server, credentials("access-1", "refresh-1"))
        .with_listener(listener.clone());

    let err = client.refresh_token().await.expect_err("incomplete payload");
    assert_eq!(err.kind(), FailureKind::ResponseTypeUnexpected);
    assert_eq!(client.credentials().access_token(), Some("access-1"));
    assert!(listener.events().is_empty());
}

#[tokio::test]
async fn store_tokens_listener_persists_pair_to_file_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-2", "refresh-2")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let store = Arc::new(FileOptionStore::new(OptionStoreConfig::new(dir.path().to_path_buf())));
    let client = support::client(&server, credentials("access-1", "refresh-1"))
        .with_listener(Arc::new(StoreTokens::new(store.clone())));

    client.refresh_token().await.expect("refresh");

    let reopened = FileOptionStore::new(OptionStoreConfig::new(dir.path().to_path_buf()));
    assert_eq!(reopened.get(ACCESS_TOKEN_OPTION).expect("read").as_deref(), Some("access-2"));
    assert_eq!(reopened.get(REFRESH_TOKEN_OPTION).expect("read").as_deref(), Some("refresh-2"));
    assert_eq!(
        reopened.get(TOKEN_EXPIRES_OPTION).expect("read").as_deref(),
        Some("1700007200")
    );
}

#[tokio::test]
async fn verifier_survives_in_file_store_across_clients() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("tempdir");
    let store = || -> Arc<dyn OptionStore> {
        Arc::new(FileOptionStore::new(OptionStoreConfig::new(dir.path().to_path_buf())))
    };

    let url_before = client_with_store(&server, store())
        .oauth_url(&AuthorizeOptions::default())
        .expect("oauth url");
    let url_after = client_with_store(&server, store())
        .oauth_url(&AuthorizeOptions::default())
        .expect("oauth url");

    assert_eq!(url_before, url_after);
}

#[tokio::test]
async fn out_of_range_token_lifetime_is_stored_without_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2",
            "created_at": 1_700_000_000,
            "expires_in": i64::MAX
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryOptionStore::new());
    let client = support::client(&server, credentials("access-1", "refresh-1"))
        .with_listener(Arc::new(StoreTokens::new(store.clone())));

    let tokens = client.refresh_token().await.expect("refresh");

    assert_eq!(tokens.expires_at(), None);
    assert_eq!(client.credentials().access_token(), Some("access-2"));
    assert_eq!(store.get(ACCESS_TOKEN_OPTION).expect("read").as_deref(), Some("access-2"));
    assert_eq!(store.get(REFRESH_TOKEN_OPTION).expect("read").as_deref(), Some("refresh-2"));
    assert_eq!(store.get(TOKEN_EXPIRES_OPTION).expect("read"), None);
}

#[tokio::test]
async fn token_response_without_created_at_is_stored_without_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2",
            "expires_in": 7200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryOptionStore::new());
    let listener = RecordingListener::new();
    let client = support::client(&server, credentials("access-1", "refresh-1"))
        .with_listener(Arc::new(StoreTokens::new(store.clone())))
        .with_listener(listener.clone());

    client.refresh_token().await.expect("refresh");

    assert_eq!(store.get(ACCESS_TOKEN_OPTION).expect("read").as_deref(), Some("access-2"));
    assert_eq!(store.get(TOKEN_EXPIRES_OPTION).expect("read"), None);
    assert_eq!(listener.events().len(), 1);
}
