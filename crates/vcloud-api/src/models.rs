//! Records exchanged with the platform.
//!
//! Field names follow the server's JSON: camelCase, with `ID`/`URL`
//! acronyms kept upper-case (`userID`, `gitURL`, ...).

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::resource::Resource;

// ── Activity ─────────────────────────────────────────────────────────

/// Handle for an in-progress asynchronous operation, e.g. a deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
}

impl Resource for Activity {
    fn id(&self) -> Uuid {
        self.id
    }
}

// ── Users ────────────────────────────────────────────────────────────

/// Account record, from `GET auth/users/me` or signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Resource for CloudUser {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Signup payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub organization_name: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
}

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

// ── SSH keys ─────────────────────────────────────────────────────────

/// Public key registered for git pushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshKey {
    pub id: Uuid,
    pub name: String,
    pub key: String,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Resource for SshKey {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Create payload for [`SshKey`].
#[derive(Debug, Clone, Serialize)]
pub struct NewSshKey {
    pub name: String,
    pub key: String,
}

// ── Applications ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudApp {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub namespace: String,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(rename = "gitURL")]
    pub git_url: String,
    #[serde(rename = "organizationID")]
    pub organization_id: Uuid,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Resource for CloudApp {
    fn id(&self) -> Uuid {
        self.id
    }
}

// ── Environments ─────────────────────────────────────────────────────

/// Deploy target belonging to an application.
///
/// `activity` is present while (or right after) a deploy is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudEnv {
    pub id: Uuid,
    pub slug: String,
    pub default_branch: String,
    #[serde(rename = "applicationID")]
    pub application_id: Uuid,
    #[serde(rename = "regionID")]
    pub region_id: Uuid,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub activity: Option<Activity>,
}

impl Resource for CloudEnv {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn environment_without_activity_decodes() {
        let env: CloudEnv = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "slug": "production",
            "defaultBranch": "main",
            "applicationID": Uuid::nil(),
            "regionID": Uuid::nil()
        }))
        .unwrap();
        assert_eq!(env.default_branch, "main");
        assert!(env.activity.is_none());
    }

    #[test]
    fn app_uses_acronym_field_names() {
        let org = Uuid::new_v4();
        let app: CloudApp = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "name": "Todo",
            "slug": "todo",
            "namespace": "acme",
            "github": null,
            "gitURL": "git@git.example.com:acme/todo.git",
            "organizationID": org,
            "createdAt": "2019-01-01T00:00:00Z",
            "updatedAt": "2019-01-02T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(app.organization_id, org);
        assert_eq!(app.git_url, "git@git.example.com:acme/todo.git");
    }

    #[test]
    fn signup_payload_sends_password_in_clear_but_debug_hides_it() {
        let new = NewUser {
            email: "a@b.c".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            organization_name: "Engines".into(),
            password: SecretString::from("hunter2".to_owned()),
        };
        let body = serde_json::to_value(&new).unwrap();
        assert_eq!(body["password"], "hunter2");
        assert_eq!(body["organizationName"], "Engines");
        assert!(!format!("{new:?}").contains("hunter2"));
    }
}
