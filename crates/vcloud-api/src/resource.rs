// Generic CRUD over one server collection.
//
// Each concrete resource (SSH key, application, environment) instantiates
// `ResourceAccess<T>` with its own shape and collection URL. Every call is
// a single round trip; failures come back exactly as the transport
// produced them.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::credential::Credential;
use crate::error::Error;
use crate::transport::{Request, Transport};

/// A server-managed record with a server-assigned UUID.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync {
    fn id(&self) -> Uuid;
}

/// CRUD operations for resources of type `T` under `base_url`.
pub struct ResourceAccess<T> {
    transport: Transport,
    credential: Arc<Credential>,
    base_url: Url,
    update_method: Method,
    _resource: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for ResourceAccess<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceAccess")
            .field("resource", &std::any::type_name::<T>())
            .field("base_url", &self.base_url.as_str())
            .field("update_method", &self.update_method)
            .finish_non_exhaustive()
    }
}

impl<T: Resource> ResourceAccess<T> {
    /// Updates default to `PATCH`; see [`with_update_method`](Self::with_update_method).
    pub fn new(transport: Transport, credential: Arc<Credential>, base_url: Url) -> Self {
        Self {
            transport,
            credential,
            base_url,
            update_method: Method::PATCH,
            _resource: PhantomData,
        }
    }

    /// Override the verb used by [`update`](Self::update).
    pub fn with_update_method(mut self, method: Method) -> Self {
        self.update_method = method;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base_url}/{id}`. `id` may carry extra segments, e.g. `"{uuid}/deploy"`.
    pub fn member_url(&self, id: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{id}"))?)
    }

    fn authed(&self, request: Request) -> Request {
        request.with_bearer(Arc::clone(&self.credential))
    }

    /// `POST {base_url}` with `payload`, decoding the created record.
    pub async fn create<P: Serialize + ?Sized>(&self, payload: &P) -> Result<T, Error> {
        let request = self
            .authed(Request::post(self.base_url.clone()))
            .with_json(payload)?;
        self.transport.fetch(request).await
    }

    /// `GET {base_url}`, in server order.
    pub async fn list(&self) -> Result<Vec<T>, Error> {
        let request = self.authed(Request::get(self.base_url.clone()));
        self.transport.fetch(request).await
    }

    /// `GET {base_url}/{id}`.
    pub async fn fetch(&self, id: &str) -> Result<T, Error> {
        let request = self.authed(Request::get(self.member_url(id)?));
        self.transport.fetch(request).await
    }

    /// Send a partial payload to `{base_url}/{id}` and decode the full record.
    pub async fn update<P: Serialize + ?Sized>(&self, id: &str, partial: &P) -> Result<T, Error> {
        let request = self
            .authed(Request::new(self.update_method.clone(), self.member_url(id)?))
            .with_json(partial)?;
        self.transport.fetch(request).await
    }

    /// `DELETE {base_url}/{id}`; the body is validated, then dropped.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let request = self.authed(Request::delete(self.member_url(id)?));
        self.transport.execute(request).await
    }
}
