// Explicit client context: built once at startup, passed by reference.
//
// Holds the shared transport, the endpoint table and the active
// credential. The credential is an immutable value behind `ArcSwapOption`:
// readers take an `Arc` snapshot, re-login swaps in a new one, and
// in-flight requests keep the snapshot they started with.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::SecretString;
use tracing::info;

use crate::activity::ActivityStream;
use crate::applications::ApplicationApi;
use crate::credential::Credential;
use crate::endpoints::Endpoints;
use crate::environments::EnvironmentApi;
use crate::error::Error;
use crate::resource::{Resource, ResourceAccess};
use crate::ssh_keys::SshKeyApi;
use crate::transport::{Transport, TransportConfig};
use crate::users::UserApi;

/// Everything needed to build a [`CloudClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub transport: TransportConfig,
}

#[derive(Debug)]
pub struct CloudClient {
    transport: Transport,
    endpoints: Endpoints,
    credential: ArcSwapOption<Credential>,
}

impl CloudClient {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let transport = Transport::new(&config.transport)?;
        Ok(Self::with_transport(transport, config.endpoints))
    }

    /// Build around an existing transport (tests, custom `reqwest::Client`s).
    pub fn with_transport(transport: Transport, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            credential: ArcSwapOption::empty(),
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // ── Credential ───────────────────────────────────────────────────

    /// Make `credential` the active one, replacing any previous value.
    pub fn set_credential(&self, credential: Credential) -> Arc<Credential> {
        let credential = Arc::new(credential);
        self.credential.store(Some(Arc::clone(&credential)));
        credential
    }

    pub fn clear_credential(&self) {
        self.credential.store(None);
    }

    /// Snapshot of the active credential, if it is still valid.
    pub fn credential(&self) -> Result<Arc<Credential>, Error> {
        let credential = self
            .credential
            .load_full()
            .ok_or(Error::NotAuthenticated { path: None })?;
        credential.ensure_valid()?;
        Ok(credential)
    }

    /// Authenticate and activate the resulting credential.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Arc<Credential>, Error> {
        let credential = self.users().login(email, password).await?;
        info!(user_id = %credential.user_id, "logged in");
        Ok(self.set_credential(credential))
    }

    // ── Facades ──────────────────────────────────────────────────────

    pub fn users(&self) -> UserApi<'_> {
        UserApi::new(self)
    }

    /// Generic CRUD over any collection, bound to the active credential.
    pub fn resource<T: Resource>(&self, base_url: url::Url) -> Result<ResourceAccess<T>, Error> {
        Ok(ResourceAccess::new(
            self.transport.clone(),
            self.credential()?,
            base_url,
        ))
    }

    pub fn ssh_keys(&self) -> Result<SshKeyApi, Error> {
        Ok(SshKeyApi::new(
            self.resource(self.endpoints.ssh_keys().clone())?,
        ))
    }

    pub fn applications(&self) -> Result<ApplicationApi, Error> {
        Ok(ApplicationApi::new(
            self.resource(self.endpoints.applications().clone())?,
        ))
    }

    pub fn environments(&self) -> Result<EnvironmentApi, Error> {
        Ok(EnvironmentApi::new(
            self.resource(self.endpoints.environments().clone())?,
        ))
    }

    pub fn activity(&self) -> ActivityStream {
        ActivityStream::new(self.endpoints.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;

    fn client() -> CloudClient {
        CloudClient::with_transport(
            Transport::from_reqwest(reqwest::Client::new()),
            Endpoints::hosted().unwrap(),
        )
    }

    fn credential(expires_in: Duration) -> Credential {
        Credential {
            expires_at: Utc::now() + expires_in,
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token: "tok".into(),
        }
    }

    #[test]
    fn no_credential_means_not_authenticated() {
        let client = client();
        assert!(matches!(
            client.credential(),
            Err(Error::NotAuthenticated { path: None })
        ));
        assert!(client.ssh_keys().is_err());
    }

    #[test]
    fn expired_credential_is_refused() {
        let client = client();
        client.set_credential(credential(Duration::seconds(-1)));
        assert!(matches!(
            client.credential(),
            Err(Error::ExpiredCredential { .. })
        ));
        assert!(matches!(
            client.environments(),
            Err(Error::ExpiredCredential { .. })
        ));
    }

    #[test]
    fn relogin_swaps_without_touching_existing_snapshots() {
        let client = client();
        let first = client.set_credential(credential(Duration::hours(1)));
        let snapshot = client.credential().unwrap();

        let second = client.set_credential(credential(Duration::hours(2)));

        assert_eq!(snapshot.id, first.id);
        assert_eq!(client.credential().unwrap().id, second.id);
        assert_ne!(first.id, second.id);

        client.clear_credential();
        assert!(client.credential().is_err());
    }
}
