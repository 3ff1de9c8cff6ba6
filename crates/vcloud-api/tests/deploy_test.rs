#![allow(clippy::unwrap_used)]
// Integration tests for the environment deploy trigger.

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vcloud_api::{CloudClient, CloudEnv, Credential, Endpoints, Error, Transport};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CloudClient) {
    let server = MockServer::start().await;
    let endpoints =
        Endpoints::parse(&format!("{}/v2/", server.uri()), "ws://127.0.0.1:9/").unwrap();
    let client =
        CloudClient::with_transport(Transport::from_reqwest(reqwest::Client::new()), endpoints);
    client.set_credential(Credential {
        expires_at: Utc::now() + Duration::hours(1),
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        token: "tok_deploy".into(),
    });
    (server, client)
}

fn env_json(id: Uuid, activity: Option<Uuid>) -> serde_json::Value {
    let mut body = json!({
        "id": id,
        "slug": "production",
        "defaultBranch": "main",
        "applicationID": Uuid::nil(),
        "regionID": Uuid::nil(),
        "createdAt": "2019-03-01T10:00:00Z",
        "updatedAt": "2019-03-01T10:00:00Z"
    });
    if let Some(activity_id) = activity {
        body["activity"] = json!({ "id": activity_id });
    }
    body
}

fn env(id: Uuid) -> CloudEnv {
    serde_json::from_value(env_json(id, None)).unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_deploy_returns_activity_and_defaults_branch() {
    let (server, client) = setup().await;
    let env_id = Uuid::new_v4();
    let activity_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path(format!("/v2/apps/environments/{env_id}/deploy")))
        .and(body_json(json!({ "branch": "main" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(env_json(env_id, Some(activity_id))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let activity = client
        .environments()
        .unwrap()
        .deploy(&env(env_id), None)
        .await
        .unwrap();

    assert_eq!(activity.id, activity_id);
}

#[tokio::test]
async fn test_deploy_sends_explicit_branch() {
    let (server, client) = setup().await;
    let env_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path(format!("/v2/apps/environments/{env_id}/deploy")))
        .and(body_json(json!({ "branch": "release/2.0" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(env_json(env_id, Some(Uuid::new_v4()))),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .environments()
        .unwrap()
        .deploy(&env(env_id), Some("release/2.0"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_deploy_without_activity_is_distinct_failure() {
    let (server, client) = setup().await;
    let env_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path(format!("/v2/apps/environments/{env_id}/deploy")))
        .respond_with(ResponseTemplate::new(200).set_body_json(env_json(env_id, None)))
        .mount(&server)
        .await;

    let result = client
        .environments()
        .unwrap()
        .deploy_by_id(env_id, "main")
        .await;

    match result {
        Err(Error::DeployActivityMissing { environment_id }) => {
            assert_eq!(environment_id, env_id);
        }
        other => panic!("expected DeployActivityMissing, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_deploy_envelope_is_remote_error_not_missing_activity() {
    let (server, client) = setup().await;
    let env_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path(format!("/v2/apps/environments/{env_id}/deploy")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": true,
            "reason": "Branch 'nope' does not exist."
        })))
        .mount(&server)
        .await;

    let err = client
        .environments()
        .unwrap()
        .deploy_by_id(env_id, "nope")
        .await
        .unwrap_err();

    assert_eq!(err.remote_reason(), Some("Branch 'nope' does not exist."));
}

#[tokio::test]
async fn test_list_for_application_filters_by_owner() {
    let (server, client) = setup().await;
    let app_id = Uuid::new_v4();
    let mine = Uuid::new_v4();

    let mut owned = env_json(mine, None);
    owned["applicationID"] = json!(app_id);

    Mock::given(method("GET"))
        .and(path("/v2/apps/environments"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([owned, env_json(Uuid::new_v4(), None)])),
        )
        .mount(&server)
        .await;

    let envs = client
        .environments()
        .unwrap()
        .list_for_application(app_id)
        .await
        .unwrap();

    assert_eq!(envs.len(), 1);
    assert_eq!(envs[0].id, mine);
}
