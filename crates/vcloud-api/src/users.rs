// Account endpoints: signup, login, me, password reset.
//
// Signup and reset are unauthenticated; login uses Basic auth; `me` needs
// the client's active credential.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;
use tracing::debug;

use crate::client::CloudClient;
use crate::credential::Credential;
use crate::error::Error;
use crate::models::{CloudUser, NewUser};
use crate::transport::Request;

/// Borrowed view of a [`CloudClient`] for account operations.
#[derive(Debug, Clone, Copy)]
pub struct UserApi<'a> {
    client: &'a CloudClient,
}

impl<'a> UserApi<'a> {
    pub(crate) fn new(client: &'a CloudClient) -> Self {
        Self { client }
    }

    /// Create an account.
    ///
    /// `POST auth/users`
    pub async fn signup(&self, new_user: &NewUser) -> Result<CloudUser, Error> {
        debug!(email = %new_user.email, "signing up");
        let request = Request::post(self.client.endpoints().users().clone()).with_json(new_user)?;
        self.client.transport().fetch(request).await
    }

    /// Exchange email + password for a credential without activating it.
    ///
    /// `POST auth/users/login`. See [`CloudClient::login`] to also make it
    /// the client's active credential.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Credential, Error> {
        Credential::authenticate(
            self.client.transport(),
            self.client.endpoints().login().clone(),
            email,
            password,
        )
        .await
    }

    /// The account the active credential belongs to.
    ///
    /// `GET auth/users/me`
    pub async fn me(&self) -> Result<CloudUser, Error> {
        let credential = self.client.credential()?;
        let request = Request::get(self.client.endpoints().me().clone())
            .with_bearer(Arc::clone(&credential));
        self.client.transport().fetch(request).await
    }

    /// Ask the server to email a password reset link.
    ///
    /// `POST auth/users/reset` with `{"email": ...}`
    pub async fn reset_password(&self, email: &str) -> Result<(), Error> {
        debug!(email, "requesting password reset");
        let request = Request::post(self.client.endpoints().password_reset().clone())
            .with_json(&json!({ "email": email }))?;
        self.client.transport().execute(request).await
    }
}
