//! Shared configuration for the vcloud CLI.
//!
//! TOML file + `VCLOUD_*` environment overrides, per-user paths for the
//! config and the persisted credential, and translation to
//! `vcloud_api::ClientConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vcloud_api::{
    ClientConfig, CredentialStore, DEFAULT_ACTIVITY_URL, DEFAULT_API_URL, Endpoints, TlsMode,
    TransportConfig,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL for activity channels (`ws://` or `wss://`).
    #[serde(default = "default_activity_url")]
    pub activity_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to an extra CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    /// Where the credential is persisted (defaults to the data dir).
    pub credential_path: Option<PathBuf>,

    /// Give up following a deploy after this many seconds.
    pub deploy_timeout: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            activity_url: default_activity_url(),
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            credential_path: None,
            deploy_timeout: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_activity_url() -> String {
    DEFAULT_ACTIVITY_URL.into()
}
fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Validate URLs and build the API client settings.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let api_url = parse_url("api_url", &self.api_url, &["http", "https"])?;
        let activity_url = parse_url("activity_url", &self.activity_url, &["ws", "wss"])?;

        let endpoints =
            Endpoints::new(&api_url, &activity_url).map_err(|e| ConfigError::Validation {
                field: "api_url".into(),
                reason: e.to_string(),
            })?;

        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        Ok(ClientConfig {
            endpoints,
            transport: TransportConfig {
                tls,
                timeout: Duration::from_secs(self.timeout),
                ..TransportConfig::default()
            },
        })
    }

    /// The credential store at the configured (or default) location.
    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(
            self.credential_path
                .clone()
                .unwrap_or_else(default_credential_path),
        )
    }

    pub fn deploy_timeout(&self) -> Option<Duration> {
        self.deploy_timeout.map(Duration::from_secs)
    }
}

fn parse_url(field: &str, raw: &str, schemes: &[&str]) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected {} URL, got '{}'", schemes.join("/"), url.scheme()),
        });
    }
    Ok(url)
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("cloud", "vapor", "vcloud")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the persisted credential.
pub fn default_credential_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("credential.json"),
        |dirs| dirs.data_dir().join("credential.json"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".vcloud");
    p
}

// ── Loading & saving ────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then `VCLOUD_*` variables.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("VCLOUD_"))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    Ok(figment_for(&config_path()).extract()?)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_point_at_hosted_platform() {
        let cfg = Config::default();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.activity_url, DEFAULT_ACTIVITY_URL);
        assert_eq!(cfg.timeout, 30);
        assert!(cfg.client_config().is_ok());
    }

    #[test]
    fn file_then_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    api_url = "http://localhost:8080/v2/"
                    timeout = 5
                "#,
            )?;
            jail.set_env("VCLOUD_TIMEOUT", "12");
            jail.set_env("VCLOUD_INSECURE", "true");

            let cfg: Config = figment_for(Path::new("config.toml")).extract()?;
            assert_eq!(cfg.api_url, "http://localhost:8080/v2/");
            assert_eq!(cfg.activity_url, DEFAULT_ACTIVITY_URL);
            assert_eq!(cfg.timeout, 12);
            assert!(cfg.insecure);
            Ok(())
        });
    }

    #[test]
    fn client_config_carries_tls_and_timeout() {
        let cfg = Config {
            insecure: true,
            timeout: 7,
            ..Config::default()
        };
        let client = cfg.client_config().unwrap();
        assert!(matches!(client.transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(client.transport.timeout, Duration::from_secs(7));
        assert_eq!(
            client.endpoints.login().as_str(),
            "https://api.v2.vapor.cloud/v2/auth/users/login"
        );
    }

    #[test]
    fn wrong_scheme_is_a_validation_error() {
        let cfg = Config {
            activity_url: "https://api.v2.vapor.cloud/v2/activity/".into(),
            ..Config::default()
        };
        match cfg.client_config() {
            Err(ConfigError::Validation { field, .. }) => assert_eq!(field, "activity_url"),
            other => panic!("expected Validation error, got: {other:?}"),
        }
    }

    #[test]
    fn credential_path_override() {
        let cfg = Config {
            credential_path: Some(PathBuf::from("/tmp/vcloud-test/credential.json")),
            ..Config::default()
        };
        assert_eq!(
            cfg.credential_store().path(),
            Path::new("/tmp/vcloud-test/credential.json")
        );
        assert!(Config::default().credential_store().path().ends_with("credential.json"));
    }

    #[test]
    fn save_then_reload() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested").join("config.toml");
            let cfg = Config {
                deploy_timeout: Some(600),
                ..Config::default()
            };
            save_config_to(&cfg, &path).map_err(|e| e.to_string())?;

            let loaded: Config = figment_for(&path).extract()?;
            assert_eq!(loaded, cfg);
            assert_eq!(loaded.deploy_timeout(), Some(Duration::from_secs(600)));
            Ok(())
        });
    }
}
