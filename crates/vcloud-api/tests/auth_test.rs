#![allow(clippy::unwrap_used)]
// Integration tests for login, signup, `me` and password reset.

use chrono::{Duration, Utc};
use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{basic_auth, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vcloud_api::{CloudClient, Endpoints, Error, NewUser, Transport};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CloudClient) {
    let server = MockServer::start().await;
    let endpoints =
        Endpoints::parse(&format!("{}/v2/", server.uri()), "ws://127.0.0.1:9/").unwrap();
    let client =
        CloudClient::with_transport(Transport::from_reqwest(reqwest::Client::new()), endpoints);
    (server, client)
}

fn password(raw: &str) -> SecretString {
    SecretString::from(raw.to_owned())
}

fn credential_body(token: &str, user_id: Uuid) -> serde_json::Value {
    json!({
        "expiresAt": (Utc::now() + Duration::hours(1)).to_rfc3339(),
        "id": Uuid::new_v4(),
        "userID": user_id,
        "token": token
    })
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_uses_basic_auth_and_activates_credential() {
    let (server, client) = setup().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/v2/auth/users/login"))
        .and(basic_auth("ada@example.com", "12ThreeFour!"))
        .respond_with(ResponseTemplate::new(200).set_body_json(credential_body("tok", user_id)))
        .expect(1)
        .mount(&server)
        .await;

    let credential = client
        .login("ada@example.com", &password("12ThreeFour!"))
        .await
        .unwrap();

    assert_eq!(credential.user_id, user_id);
    assert!(credential.is_valid());
    assert_eq!(client.credential().unwrap().token, "tok");
}

#[tokio::test]
async fn test_login_rejected_status_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/auth/users/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let result = client.login("ada@example.com", &password("wrong")).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(client.credential().is_err());
}

#[tokio::test]
async fn test_login_envelope_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/auth/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": true,
            "reason": "Invalid email or password."
        })))
        .mount(&server)
        .await;

    let result = client.login("ada@example.com", &password("wrong")).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert_eq!(message, "Invalid email or password.");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

// ── Account endpoints ───────────────────────────────────────────────

#[tokio::test]
async fn test_signup_is_unauthenticated_post() {
    let (server, client) = setup().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/v2/auth/users"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "organizationName": "Engines",
            "password": "12ThreeFour!"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client
        .users()
        .signup(&NewUser {
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            organization_name: "Engines".into(),
            password: password("12ThreeFour!"),
        })
        .await
        .unwrap();

    assert_eq!(user.id, id);
    assert_eq!(user.first_name, "Ada");
}

#[tokio::test]
async fn test_me_requires_and_sends_bearer() {
    let (server, client) = setup().await;
    let user_id = Uuid::new_v4();

    assert!(matches!(
        client.users().me().await,
        Err(Error::NotAuthenticated { path: None })
    ));

    Mock::given(method("POST"))
        .and(path("/v2/auth/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(credential_body("tok_me", user_id)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/auth/users/me"))
        .and(header("Authorization", "Bearer tok_me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": user_id,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .login("ada@example.com", &password("12ThreeFour!"))
        .await
        .unwrap();
    let me = client.users().me().await.unwrap();

    assert_eq!(me.id, user_id);
    assert_eq!(me.email, "ada@example.com");
}

#[tokio::test]
async fn test_reset_password_validates_only() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/auth/users/reset"))
        .and(body_json(json!({ "email": "ada@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "sent" })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .users()
        .reset_password("ada@example.com")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reset_password_surfaces_envelope_reason() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/auth/users/reset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": true,
            "reason": "No account for that email."
        })))
        .mount(&server)
        .await;

    let err = client
        .users()
        .reset_password("nobody@example.com")
        .await
        .unwrap_err();

    assert_eq!(err.remote_reason(), Some("No account for that email."));
}
