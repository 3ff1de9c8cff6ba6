// Access credential issued by the login exchange, and its on-disk store.
//
// A `Credential` is an immutable value: re-login produces a new one that
// replaces the old wholesale. The store holds at most one credential and
// replaces it with a temp-file + rename so a torn write never looks like
// "not logged in".

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::error::Error;
use crate::transport::{Request, RequestAuth, Transport};

/// Bearer token plus the metadata the server issued it with.
///
/// Wire shape: `{"expiresAt", "id", "userID", "token"}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub expires_at: DateTime<Utc>,
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub token: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("expires_at", &self.expires_at)
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Credential {
    /// Exchange email + password (Basic auth) for a credential.
    ///
    /// `POST {login_url}`. Any non-2xx status or error envelope is an
    /// [`Error::Authentication`]; a 2xx body that is not a credential is
    /// [`Error::MalformedResponse`].
    pub async fn authenticate(
        transport: &Transport,
        login_url: Url,
        email: &str,
        password: &SecretString,
    ) -> Result<Self, Error> {
        debug!(email, "authenticating");

        let request = Request::post(login_url).with_auth(RequestAuth::Basic {
            username: email.to_owned(),
            password: password.expose_secret().to_owned().into(),
        });
        let raw = transport.send(request).await?;

        if let Some(envelope) = raw.server_error() {
            return Err(Error::Authentication {
                message: envelope.reason,
            });
        }
        if !raw.status.is_success() {
            return Err(Error::Authentication {
                message: format!("login rejected (HTTP {})", raw.status),
            });
        }

        let credential: Self = raw.decode()?;
        debug!(user_id = %credential.user_id, expires_at = %credential.expires_at, "authenticated");
        Ok(credential)
    }

    /// `true` iff the current time is strictly before `expires_at`.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Fail with [`Error::ExpiredCredential`] unless still valid.
    pub fn ensure_valid(&self) -> Result<(), Error> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::ExpiredCredential {
                expired_at: self.expires_at,
            })
        }
    }

    /// `Authorization: Bearer <token>` value, refused once expired.
    pub fn bearer_header(&self) -> Result<HeaderValue, Error> {
        self.ensure_valid()?;
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.token)).map_err(|e| {
            Error::Authentication {
                message: format!("token is not a valid header value: {e}"),
            }
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

// ── Persistence ──────────────────────────────────────────────────────

/// Single-slot JSON file holding the active credential.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted credential.
    ///
    /// Distinguishes a missing file ([`Error::NotAuthenticated`]), an
    /// undecodable one ([`Error::CorruptCredential`]) and an expired one
    /// ([`Error::ExpiredCredential`]).
    pub fn load(&self) -> Result<Credential, Error> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotAuthenticated {
                    path: Some(self.path.clone()),
                });
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let credential: Credential =
            serde_json::from_slice(&bytes).map_err(|e| Error::CorruptCredential {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        credential.ensure_valid()?;
        Ok(credential)
    }

    /// Write `credential`, replacing whatever was stored before.
    pub fn save(&self, credential: &Credential) -> Result<(), Error> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, credential).map_err(std::io::Error::from)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        debug!(path = %self.path.display(), "credential saved");
        Ok(())
    }

    /// Remove the stored credential. Returns `false` if there was none.
    pub fn discard(&self) -> Result<bool, Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
