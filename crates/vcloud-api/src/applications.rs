// Application endpoints (`apps/applications`).

use uuid::Uuid;

use crate::error::Error;
use crate::models::CloudApp;
use crate::resource::ResourceAccess;

#[derive(Debug)]
pub struct ApplicationApi {
    access: ResourceAccess<CloudApp>,
}

impl ApplicationApi {
    pub fn new(access: ResourceAccess<CloudApp>) -> Self {
        Self { access }
    }

    pub async fn list(&self) -> Result<Vec<CloudApp>, Error> {
        self.access.list().await
    }

    pub async fn fetch(&self, id: Uuid) -> Result<CloudApp, Error> {
        self.access.fetch(&id.to_string()).await
    }

    /// Find an application by slug among the listed ones.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<CloudApp>, Error> {
        let apps = self.list().await?;
        Ok(apps.into_iter().find(|app| app.slug == slug))
    }
}
