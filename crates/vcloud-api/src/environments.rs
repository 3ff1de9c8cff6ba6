// Environment endpoints (`apps/environments`), including the deploy trigger.
//
// A deploy is an update of `{environments}/{id}/deploy` with a `branch`
// field; the environment record that comes back names the activity to
// follow on the activity channel.

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{Activity, CloudEnv};
use crate::resource::{Resource, ResourceAccess};

#[derive(Debug)]
pub struct EnvironmentApi {
    access: ResourceAccess<CloudEnv>,
}

impl EnvironmentApi {
    pub fn new(access: ResourceAccess<CloudEnv>) -> Self {
        Self { access }
    }

    pub async fn list(&self) -> Result<Vec<CloudEnv>, Error> {
        self.access.list().await
    }

    /// Environments belonging to one application.
    pub async fn list_for_application(&self, application_id: Uuid) -> Result<Vec<CloudEnv>, Error> {
        let envs = self.list().await?;
        Ok(envs
            .into_iter()
            .filter(|env| env.application_id == application_id)
            .collect())
    }

    pub async fn fetch(&self, id: Uuid) -> Result<CloudEnv, Error> {
        self.access.fetch(&id.to_string()).await
    }

    /// Start a deploy of `branch` (or the environment's default branch).
    ///
    /// Returns the activity to stream. A successful response without an
    /// `activity` field is [`Error::DeployActivityMissing`].
    pub async fn deploy(&self, env: &CloudEnv, branch: Option<&str>) -> Result<Activity, Error> {
        self.deploy_by_id(env.id(), branch.unwrap_or(&env.default_branch))
            .await
    }

    /// Deploy by id when the environment record is not at hand.
    pub async fn deploy_by_id(&self, environment_id: Uuid, branch: &str) -> Result<Activity, Error> {
        debug!(%environment_id, branch, "triggering deploy");

        let path = format!("{environment_id}/deploy");
        let package = json!({ "branch": branch });
        let env = self.access.update(&path, &package).await?;

        let activity = env
            .activity
            .ok_or(Error::DeployActivityMissing { environment_id })?;
        info!(%environment_id, activity_id = %activity.id, "deploy started");
        Ok(activity)
    }
}
