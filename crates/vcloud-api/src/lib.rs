// vcloud-api: Async Rust client for the Vapor Cloud v2 API
//
// Credential lifecycle, a generic CRUD layer shared by every resource type,
// and the activity channel used to follow deploys to completion.

pub mod activity;
pub mod applications;
pub mod client;
pub mod credential;
pub mod endpoints;
pub mod environments;
pub mod error;
pub mod models;
pub mod resource;
pub mod ssh_keys;
pub mod transport;
pub mod users;

pub use activity::{ActivityEvent, ActivityStream, ListenOptions, StreamEnd};
pub use applications::ApplicationApi;
pub use client::{ClientConfig, CloudClient};
pub use credential::{Credential, CredentialStore};
pub use endpoints::{DEFAULT_ACTIVITY_URL, DEFAULT_API_URL, Endpoints};
pub use environments::EnvironmentApi;
pub use error::Error;
pub use models::{Activity, CloudApp, CloudEnv, CloudUser, NewSshKey, NewUser, SshKey};
pub use resource::{Resource, ResourceAccess};
pub use ssh_keys::SshKeyApi;
pub use transport::{RawResponse, Request, RequestAuth, ServerError, TlsMode, Transport, TransportConfig};
pub use users::UserApi;
