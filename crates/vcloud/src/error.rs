//! CLI error types with miette diagnostics.
//!
//! Maps `vcloud_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;
use uuid::Uuid;

use vcloud_config::ConfigError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {target}")]
    #[diagnostic(
        code(vcloud::connection_failed),
        help("Check your network connection and the api_url / activity_url settings (vcloud config show).")
    )]
    ConnectionFailed {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(vcloud::tls_error),
        help("Use --insecure (-k) for development servers, or set ca_cert in the config file.")
    )]
    TlsError { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(code(vcloud::auth_failed), help("Check your email and password, then run: vcloud login"))]
    AuthFailed { message: String },

    #[error("Not logged in")]
    #[diagnostic(code(vcloud::not_logged_in), help("Run: vcloud login"))]
    NotLoggedIn,

    #[error("Session expired at {expired_at}")]
    #[diagnostic(code(vcloud::expired), help("Run: vcloud login"))]
    SessionExpired { expired_at: String },

    #[error("Stored credential at {path} is unreadable")]
    #[diagnostic(
        code(vcloud::corrupt_credential),
        help("{message}\nRun: vcloud logout && vcloud login")
    )]
    CorruptCredential { path: String, message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(vcloud::not_found),
        help("Run: vcloud {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{count} {resource_type}s are named '{identifier}'")]
    #[diagnostic(
        code(vcloud::ambiguous),
        help("Names must be unique to delete by name. Remove the duplicates from the dashboard.")
    )]
    Ambiguous {
        resource_type: String,
        identifier: String,
        count: usize,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(vcloud::api_error))]
    ApiError { message: String },

    #[error("Deploy of {environment_id} did not start an activity")]
    #[diagnostic(code(vcloud::deploy_not_started))]
    DeployNotStarted { environment_id: Uuid },

    #[error("Activity stream failed: {detail}")]
    #[diagnostic(code(vcloud::stream))]
    StreamFailed { detail: String },

    #[error("Deploy output interrupted")]
    #[diagnostic(
        code(vcloud::interrupted),
        help("The deploy keeps running on the server; only local streaming stopped.")
    )]
    Interrupted,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vcloud::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(vcloud::config), help("Inspect the file at: vcloud config path"))]
    Config(#[from] ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Timed out after {seconds}s")]
    #[diagnostic(
        code(vcloud::timeout),
        help("Increase --timeout, or deploy_timeout in the config file.")
    )]
    Timeout { seconds: u64 },

    #[error("Request timed out")]
    #[diagnostic(code(vcloud::timeout), help("Increase the request timeout with --timeout."))]
    RequestTimeout,

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(vcloud::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::NotLoggedIn
            | Self::SessionExpired { .. }
            | Self::CorruptCredential { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Ambiguous { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } | Self::RequestTimeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            Self::Interrupted => exit_code::INTERRUPTED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── vcloud_api::Error → CliError mapping ─────────────────────────────

impl From<vcloud_api::Error> for CliError {
    fn from(err: vcloud_api::Error) -> Self {
        use vcloud_api::Error as E;

        match err {
            E::Authentication { message } => CliError::AuthFailed { message },
            E::NotAuthenticated { .. } => CliError::NotLoggedIn,
            E::ExpiredCredential { expired_at } => CliError::SessionExpired {
                expired_at: expired_at.to_rfc3339(),
            },
            E::CorruptCredential { path, message } => CliError::CorruptCredential {
                path: path.display().to_string(),
                message,
            },
            E::Transport(e) if e.is_timeout() => CliError::RequestTimeout,
            E::Transport(e) => CliError::ConnectionFailed {
                target: e.url().map_or_else(|| "the API".into(), ToString::to_string),
                source: Box::new(e),
            },
            E::InvalidUrl(e) => CliError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
            E::Tls(message) => CliError::TlsError { message },
            E::Serialization(e) => CliError::Json(e),
            E::Io(e) => CliError::Io(e),
            E::Remote { reason } => CliError::ApiError { message: reason },
            E::MalformedResponse { message, .. } => CliError::ApiError {
                message: format!("unexpected response: {message}"),
            },
            E::DeployActivityMissing { environment_id } => {
                CliError::DeployNotStarted { environment_id }
            }
            E::WebSocketConnect(reason) => CliError::ConnectionFailed {
                target: "the activity channel".into(),
                source: reason.into(),
            },
            E::StreamProtocolViolation { detail } => CliError::StreamFailed { detail },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn auth_failures_share_an_exit_code() {
        let errs: Vec<CliError> = vec![
            vcloud_api::Error::NotAuthenticated {
                path: Some(PathBuf::from("/tmp/credential.json")),
            }
            .into(),
            vcloud_api::Error::ExpiredCredential {
                expired_at: chrono::Utc::now(),
            }
            .into(),
            vcloud_api::Error::Authentication {
                message: "bad password".into(),
            }
            .into(),
        ];
        for err in errs {
            assert_eq!(err.exit_code(), exit_code::AUTH, "{err}");
        }
    }

    #[test]
    fn remote_reason_is_shown_verbatim() {
        let err: CliError = vcloud_api::Error::Remote {
            reason: "Environment is locked".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Environment is locked");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn websocket_failure_is_a_connection_error() {
        let err: CliError = vcloud_api::Error::WebSocketConnect("refused".into()).into();
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }
}
