//! Mock API tests for the lektio library.
//!
//! These tests use wiremock to simulate the marketplace backend and test
//! the session's behavior without network access or real credentials.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lektio::{ApiUrl, AuthError, Config, Error, MemoryTokenStore, Session, TokenPair, TokenStore};

/// Helper to create an API URL from a mock server.
fn mock_api_url(server: &MockServer) -> ApiUrl {
    // For tests, HTTP localhost is allowed
    ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

/// Forge an unsigned JWT carrying the backend's claim layout.
fn forge_jwt(user_id: u64, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "user_id": user_id,
            "exp": exp,
            "iat": exp - 3600,
            "email": "alice@example.com",
            "full_name": "Alice Example",
        })
        .to_string()
        .as_bytes(),
    );
    format!("{header}.{payload}.test-signature")
}

fn jwt_valid_for(user_id: u64, seconds: i64) -> String {
    forge_jwt(user_id, Utc::now().timestamp() + seconds)
}

fn session_with_store(server: &MockServer, store: Arc<MemoryTokenStore>) -> Session {
    Session::new(Config::new(mock_api_url(server)), store)
}

// ============================================================================
// Login / Registration / Logout
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;
    let access = jwt_valid_for(42, 3600);

    Mock::given(method("POST"))
        .and(path("/api/v1/user/token/"))
        .and(body_json(json!({
            "email": "alice@example.com",
            "password": "secret123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": access,
            "refresh": "refresh-token"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = session_with_store(&server, store.clone());

    let identity = session.login("alice@example.com", "secret123").await.unwrap();

    assert_eq!(identity.user_id, 42);
    assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
    assert!(session.state().snapshot().is_authenticated());

    // The pair from the issuance event is persisted together; the token
    // value itself is deliberately hidden, so check through its claims
    let pair = store.read().unwrap();
    assert_eq!(lektio::Claims::decode(&pair.access).unwrap().user_id, 42);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/user/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "invalid credentials"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = session_with_store(&server, store.clone());

    let err = session.login("a@b.com", "bad").await.unwrap_err();

    match err {
        Error::Auth(AuthError::InvalidCredentials { detail }) => {
            assert_eq!(detail, "invalid credentials");
        }
        other => panic!("expected InvalidCredentials, got {other:?}"),
    }

    // Session untouched: store empty, state still in its bootstrap phase
    assert!(store.read().is_none());
    assert!(session.state().snapshot().loading);
}

#[tokio::test]
async fn test_register_then_login() {
    let server = MockServer::start().await;
    let access = jwt_valid_for(7, 3600);

    Mock::given(method("POST"))
        .and(path("/api/v1/user/register/"))
        .and(body_json(json!({
            "full_name": "Alice Example",
            "email": "alice@example.com",
            "password": "secret123",
            "password2": "secret123"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "full_name": "Alice Example",
            "email": "alice@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/user/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": access,
            "refresh": "refresh-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_with_store(&server, Arc::new(MemoryTokenStore::new()));

    let identity = session
        .register("Alice Example", "alice@example.com", "secret123", "secret123")
        .await
        .unwrap();

    assert_eq!(identity.user_id, 7);
    assert!(session.state().snapshot().is_authenticated());
}

#[tokio::test]
async fn test_logout_without_session_is_a_noop() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryTokenStore::new());
    let session = session_with_store(&server, store.clone());

    session.logout();
    session.logout();

    assert!(store.read().is_none());
    let snap = session.state().snapshot();
    assert!(!snap.loading);
    assert!(snap.identity.is_none());
}

#[tokio::test]
async fn test_login_completing_after_logout_is_discarded() {
    let server = MockServer::start().await;
    let access = jwt_valid_for(42, 3600);

    Mock::given(method("POST"))
        .and(path("/api/v1/user/token/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": access, "refresh": "refresh-token" }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = session_with_store(&server, store.clone());

    let login = tokio::spawn({
        let session = session.clone();
        async move { session.login("alice@example.com", "secret123").await }
    });

    // Logout while the login response is still in flight
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.logout();

    let result = login.await.unwrap();
    assert!(matches!(result, Err(Error::Auth(AuthError::Superseded))));

    // The logout wins: nothing persisted, still anonymous
    assert!(store.read().is_none());
    assert!(session.state().snapshot().identity.is_none());
}

// ============================================================================
// Interceptor and Refresh
// ============================================================================

#[tokio::test]
async fn test_valid_token_attached_without_refresh() {
    let server = MockServer::start().await;
    let access = jwt_valid_for(42, 3600);

    // No refresh mock mounted: any refresh attempt would 404 and fail
    Mock::given(method("GET"))
        .and(path("/api/v1/user/profile/42/"))
        .and(header("authorization", format!("Bearer {access}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "Alice Example",
            "email": "alice@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    store
        .persist(&TokenPair::new(access.clone(), "refresh-token"))
        .unwrap();
    let session = session_with_store(&server, store);

    let profile = session.profile().await.unwrap();
    assert_eq!(profile.full_name, "Alice Example");
}

#[tokio::test]
async fn test_expired_access_triggers_refresh_then_request_proceeds() {
    let server = MockServer::start().await;
    let expired = forge_jwt(42, Utc::now().timestamp() - 7200); // valid 1h, clock 2h later
    let fresh = jwt_valid_for(42, 3600);

    Mock::given(method("POST"))
        .and(path("/api/v1/user/token/refresh/"))
        .and(body_json(json!({ "refresh": "refresh-valid-7d" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": fresh,
            "refresh": "refresh-rotated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user/profile/42/"))
        .and(header("authorization", format!("Bearer {fresh}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "Alice Example"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    store
        .persist(&TokenPair::new(expired, "refresh-valid-7d"))
        .unwrap();
    let session = session_with_store(&server, store.clone());

    let profile = session.profile().await.unwrap();
    assert_eq!(profile.full_name, "Alice Example");

    // The rotated pair was persisted and identity re-derived
    assert!(store.read().is_some());
    assert_eq!(session.state().snapshot().identity.unwrap().user_id, 42);
}

#[tokio::test]
async fn test_concurrent_requests_coalesce_into_one_refresh() {
    let server = MockServer::start().await;
    let expired = forge_jwt(42, Utc::now().timestamp() - 60);
    let fresh = jwt_valid_for(42, 3600);

    // Exactly one exchange for the whole batch
    Mock::given(method("POST"))
        .and(path("/api/v1/user/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": fresh, "refresh": "refresh-rotated" }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user/profile/42/"))
        .and(header("authorization", format!("Bearer {fresh}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "Alice Example"
        })))
        .expect(5)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    store
        .persist(&TokenPair::new(expired, "refresh-token"))
        .unwrap();
    let session = session_with_store(&server, store);

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let session = session.clone();
            tokio::spawn(async move { session.profile().await })
        })
        .collect();

    for handle in handles {
        let profile = handle.await.unwrap().unwrap();
        assert_eq!(profile.full_name, "Alice Example");
    }
}

#[tokio::test]
async fn test_refresh_failure_fails_batch_and_clears_session() {
    let server = MockServer::start().await;
    let expired = forge_jwt(42, Utc::now().timestamp() - 60);

    Mock::given(method("POST"))
        .and(path("/api/v1/user/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "token is invalid or expired" }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    store
        .persist(&TokenPair::new(expired, "stale-refresh"))
        .unwrap();
    let session = session_with_store(&server, store.clone());

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let session = session.clone();
            tokio::spawn(async move { session.profile().await })
        })
        .collect();

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(
            matches!(err, Error::Auth(AuthError::RefreshFailed { .. })),
            "expected RefreshFailed, got {err:?}"
        );
    }

    // Equivalent of being logged out, so the UI can redirect to login
    assert!(store.read().is_none());
    assert!(session.state().snapshot().identity.is_none());
}

#[tokio::test]
async fn test_authed_request_without_tokens_fails_locally() {
    let server = MockServer::start().await;
    let session = session_with_store(&server, Arc::new(MemoryTokenStore::new()));

    let err = session.enrolled_courses().await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::NotAuthenticated)));

    // Nothing was sent
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Bootstrap
// ============================================================================

#[tokio::test]
async fn test_bootstrap_with_valid_token() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryTokenStore::new());
    store
        .persist(&TokenPair::new(jwt_valid_for(42, 3600), "refresh-token"))
        .unwrap();
    let session = session_with_store(&server, store);

    session.bootstrap().await;

    let snap = session.state().snapshot();
    assert!(!snap.loading);
    assert_eq!(snap.identity.unwrap().user_id, 42);

    // Resolved locally, no network round trip
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bootstrap_with_empty_store() {
    let server = MockServer::start().await;
    let session = session_with_store(&server, Arc::new(MemoryTokenStore::new()));

    session.bootstrap().await;

    let snap = session.state().snapshot();
    assert!(!snap.loading);
    assert!(snap.identity.is_none());
}

#[tokio::test]
async fn test_bootstrap_with_expired_token_refreshes() {
    let server = MockServer::start().await;
    let expired = forge_jwt(42, Utc::now().timestamp() - 60);
    let fresh = jwt_valid_for(42, 3600);

    Mock::given(method("POST"))
        .and(path("/api/v1/user/token/refresh/"))
        .and(body_json(json!({ "refresh": "refresh-token" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": fresh,
            "refresh": "refresh-rotated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    store
        .persist(&TokenPair::new(expired, "refresh-token"))
        .unwrap();
    let session = session_with_store(&server, store);

    session.bootstrap().await;

    let snap = session.state().snapshot();
    assert!(!snap.loading);
    assert_eq!(snap.identity.unwrap().user_id, 42);
}

#[tokio::test]
async fn test_bootstrap_refresh_failure_ends_anonymous() {
    let server = MockServer::start().await;
    let expired = forge_jwt(42, Utc::now().timestamp() - 60);

    Mock::given(method("POST"))
        .and(path("/api/v1/user/token/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "token is invalid or expired"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    store
        .persist(&TokenPair::new(expired, "stale-refresh"))
        .unwrap();
    let session = session_with_store(&server, store.clone());

    session.bootstrap().await;

    let snap = session.state().snapshot();
    assert!(!snap.loading);
    assert!(snap.identity.is_none());
    assert!(store.read().is_none());
}

// ============================================================================
// Public Catalog
// ============================================================================

#[tokio::test]
async fn test_course_catalog_needs_no_authentication() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/course/course-list/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "title": "Practical Rust",
                "slug": "practical-rust",
                "price": "49.00",
                "average_rating": 4.7
            }
        ])))
        .mount(&server)
        .await;

    let session = session_with_store(&server, Arc::new(MemoryTokenStore::new()));

    let courses = session.course_catalog().await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].title, "Practical Rust");
    assert_eq!(courses[0].average_rating, Some(4.7));
}
