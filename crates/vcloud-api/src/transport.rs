// HTTP transport: one authenticated round trip per call, plus response
// normalization.
//
// The server may answer 200 with `{"error": true, "reason": "..."}`, so
// every decode first tries the error envelope and only then the expected
// type. Status codes alone are never trusted as the error signal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::credential::Credential;
use crate::error::Error;

const USER_AGENT: &str = concat!("vcloud/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (local development servers only).
    DangerAcceptInvalid,
}

/// Settings for the shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str());

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── Request ──────────────────────────────────────────────────────────

/// How a request authenticates itself.
#[derive(Debug, Default)]
pub enum RequestAuth {
    /// Unauthenticated (signup, password reset).
    #[default]
    None,
    /// `Authorization: Basic ...`, used only by the login exchange.
    Basic {
        username: String,
        password: SecretString,
    },
    /// `Authorization: Bearer <token>` from a still-valid credential.
    Bearer(Arc<Credential>),
}

/// A single outbound call: method, URL, extra headers, auth and JSON body.
#[derive(Debug)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    auth: RequestAuth,
    body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            auth: RequestAuth::None,
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_auth(mut self, auth: RequestAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_bearer(self, credential: Arc<Credential>) -> Self {
        self.with_auth(RequestAuth::Bearer(credential))
    }

    /// Attach a JSON body (`Content-Type: application/json`).
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

// ── Response ─────────────────────────────────────────────────────────

/// The `{error, reason}` envelope the server may return with any status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    pub error: bool,
    pub reason: String,
}

/// Status and body of a completed round trip, not yet interpreted.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    /// The error envelope, if the body is one with `error: true`.
    pub fn server_error(&self) -> Option<ServerError> {
        serde_json::from_str::<ServerError>(&self.body)
            .ok()
            .filter(|envelope| envelope.error)
    }

    /// Decode the body as `T`, after ruling out the error envelope.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if let Some(envelope) = self.server_error() {
            return Err(Error::Remote {
                reason: envelope.reason,
            });
        }

        serde_json::from_str(&self.body).map_err(|e| {
            let preview: String = self.body.chars().take(200).collect();
            Error::MalformedResponse {
                message: format!("HTTP {}: {e} (body preview: {preview:?})", self.status),
                body: self.body.clone(),
            }
        })
    }

    /// Check for the error envelope and discard the body otherwise.
    ///
    /// A non-2xx status without an envelope is still a failure: there is
    /// no typed body whose decode could vouch for success.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(envelope) = self.server_error() {
            return Err(Error::Remote {
                reason: envelope.reason,
            });
        }
        if self.status.is_success() {
            Ok(())
        } else {
            Err(Error::MalformedResponse {
                message: format!("HTTP {} without an error envelope", self.status),
                body: self.body.clone(),
            })
        }
    }
}

// ── Transport ────────────────────────────────────────────────────────

/// Issues requests over a shared, cheaply cloneable `reqwest::Client`.
///
/// Holds no per-call state, so concurrent callers never interfere.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
}

impl Transport {
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Perform one HTTP call and return the raw status and body.
    ///
    /// Caller headers are kept (`Accept` defaults to JSON) and merged with
    /// the auth header; a bearer credential that has expired fails here,
    /// before anything leaves the process.
    pub async fn send(&self, request: Request) -> Result<RawResponse, Error> {
        let Request {
            method,
            url,
            mut headers,
            auth,
            body,
        } = request;

        headers
            .entry(ACCEPT)
            .or_insert(HeaderValue::from_static("application/json"));

        let mut basic = None;
        match auth {
            RequestAuth::None => {}
            RequestAuth::Basic { username, password } => basic = Some((username, password)),
            RequestAuth::Bearer(credential) => {
                headers.insert(AUTHORIZATION, credential.bearer_header()?);
            }
        }

        debug!("{method} {url}");

        let mut builder = self.http.request(method, url).headers(headers);
        if let Some((username, password)) = basic {
            builder = builder.basic_auth(username, Some(password.expose_secret()));
        }
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        trace!(%status, bytes = body.len(), "response received");

        Ok(RawResponse { status, body })
    }

    /// `send` then [`RawResponse::decode`].
    pub async fn fetch<T: DeserializeOwned>(&self, request: Request) -> Result<T, Error> {
        self.send(request).await?.decode()
    }

    /// `send` then [`RawResponse::validate`].
    pub async fn execute(&self, request: Request) -> Result<(), Error> {
        self.send(request).await?.validate()
    }
}
