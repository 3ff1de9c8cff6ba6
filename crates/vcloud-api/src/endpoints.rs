// Endpoint table, derived once from the two configured base URLs.

use url::Url;
use uuid::Uuid;

use crate::error::Error;

/// Default REST base for the hosted platform.
pub const DEFAULT_API_URL: &str = "https://api.v2.vapor.cloud/v2/";

/// Default base for activity channels.
pub const DEFAULT_ACTIVITY_URL: &str = "wss://api.v2.vapor.cloud/v2/activity/";

/// Every URL the client talks to.
///
/// Built eagerly so that a bad base URL fails at configuration time rather
/// than on the first request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    users: Url,
    login: Url,
    me: Url,
    password_reset: Url,
    ssh_keys: Url,
    applications: Url,
    environments: Url,
    activity_base: Url,
}

impl Endpoints {
    /// Derive all endpoints from the REST base and the activity base.
    ///
    /// `api_base`: `https://host/v2/` -> `https://host/v2/auth/users`, ...
    /// `activity_base`: `wss://host/v2/activity/` ->
    /// `wss://host/v2/activity/activities/{id}/channel`
    pub fn new(api_base: &Url, activity_base: &Url) -> Result<Self, Error> {
        let api = with_trailing_slash(api_base);
        let activity_base = with_trailing_slash(activity_base);

        Ok(Self {
            users: api.join("auth/users")?,
            login: api.join("auth/users/login")?,
            me: api.join("auth/users/me")?,
            password_reset: api.join("auth/users/reset")?,
            ssh_keys: api.join("git/keys")?,
            applications: api.join("apps/applications")?,
            environments: api.join("apps/environments")?,
            activity_base,
        })
    }

    /// Parse both bases from strings.
    pub fn parse(api_base: &str, activity_base: &str) -> Result<Self, Error> {
        Self::new(&Url::parse(api_base)?, &Url::parse(activity_base)?)
    }

    /// The hosted platform's endpoints.
    pub fn hosted() -> Result<Self, Error> {
        Self::parse(DEFAULT_API_URL, DEFAULT_ACTIVITY_URL)
    }

    pub fn users(&self) -> &Url {
        &self.users
    }

    pub fn login(&self) -> &Url {
        &self.login
    }

    pub fn me(&self) -> &Url {
        &self.me
    }

    pub fn password_reset(&self) -> &Url {
        &self.password_reset
    }

    pub fn ssh_keys(&self) -> &Url {
        &self.ssh_keys
    }

    pub fn applications(&self) -> &Url {
        &self.applications
    }

    pub fn environments(&self) -> &Url {
        &self.environments
    }

    /// Channel address for one activity.
    pub fn activity_channel(&self, activity_id: Uuid) -> Result<Url, Error> {
        Ok(self
            .activity_base
            .join(&format!("activities/{activity_id}/channel"))?)
    }
}

fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
