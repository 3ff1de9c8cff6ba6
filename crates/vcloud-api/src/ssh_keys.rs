// SSH key endpoints (`git/keys`).

use tracing::debug;

use crate::error::Error;
use crate::models::{NewSshKey, SshKey};
use crate::resource::{Resource, ResourceAccess};

/// Keys registered for git pushes, over [`ResourceAccess<SshKey>`].
#[derive(Debug)]
pub struct SshKeyApi {
    access: ResourceAccess<SshKey>,
}

impl SshKeyApi {
    pub fn new(access: ResourceAccess<SshKey>) -> Self {
        Self { access }
    }

    /// Register a public key under `name`.
    pub async fn add(&self, name: &str, key: &str) -> Result<SshKey, Error> {
        debug!(name, "adding ssh key");
        let package = NewSshKey {
            name: name.to_owned(),
            key: key.to_owned(),
        };
        self.access.create(&package).await
    }

    pub async fn list(&self) -> Result<Vec<SshKey>, Error> {
        self.access.list().await
    }

    pub async fn delete(&self, key: &SshKey) -> Result<(), Error> {
        debug!(name = %key.name, id = %key.id(), "deleting ssh key");
        self.access.delete(&key.id().to_string()).await
    }

    /// Delete every registered key, returning how many were removed.
    ///
    /// Stops at the first failure; keys deleted before it stay deleted.
    pub async fn clear(&self) -> Result<usize, Error> {
        let keys = self.list().await?;
        for key in &keys {
            self.delete(key).await?;
        }
        Ok(keys.len())
    }
}
