use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for the `vcloud-api` crate.
///
/// Covers every failure mode across the client: local credential state,
/// login, HTTP transport, response decoding, deploy, and the activity
/// channel. Every layer propagates these unchanged; nothing retries.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login exchange rejected by the server.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// No credential is available: none was persisted at `path`, or none
    /// was ever set on the client (`path: None`).
    #[error("Not logged in")]
    NotAuthenticated { path: Option<PathBuf> },

    /// The credential's expiry timestamp has passed.
    #[error("Credential expired at {expired_at} -- log in again")]
    ExpiredCredential { expired_at: DateTime<Utc> },

    /// The persisted credential exists but could not be decoded.
    #[error("Stored credential at {} is unreadable: {message}", path.display())]
    CorruptCredential { path: PathBuf, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Request body could not be serialized.
    #[error("Request serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local filesystem failure while reading or writing the credential.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ── Server responses ────────────────────────────────────────────
    /// The server answered with the `{error: true, reason}` envelope.
    #[error("{reason}")]
    Remote { reason: String },

    /// Body matched neither the error envelope nor the expected type.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, body: String },

    /// A deploy request succeeded but the environment carried no activity.
    #[error("Deploy of environment {environment_id} returned no activity")]
    DeployActivityMissing { environment_id: Uuid },

    // ── Activity channel ────────────────────────────────────────────
    /// Activity channel handshake failed.
    #[error("Activity channel connection failed: {0}")]
    WebSocketConnect(String),

    /// The activity channel delivered a frame the protocol never sends.
    #[error("Activity channel protocol violation: {detail}")]
    StreamProtocolViolation { detail: String },
}

impl Error {
    /// Returns `true` if logging in again is the remedy.
    pub fn needs_reauthentication(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::NotAuthenticated { .. }
                | Self::ExpiredCredential { .. }
                | Self::CorruptCredential { .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying by hand.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::WebSocketConnect(_) => true,
            _ => false,
        }
    }

    /// The server-supplied reason, if this is a remote error envelope.
    pub fn remote_reason(&self) -> Option<&str> {
        match self {
            Self::Remote { reason } => Some(reason),
            _ => None,
        }
    }
}
