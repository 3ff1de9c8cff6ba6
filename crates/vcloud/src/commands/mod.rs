//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod apps;
pub mod auth;
pub mod config_cmd;
pub mod deploy;
pub mod envs;
pub mod ssh;
pub mod util;

use std::sync::Arc;

use vcloud_api::{CloudClient, Credential, CredentialStore};
use vcloud_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Everything a network-bound command needs.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub client: CloudClient,
    pub store: CredentialStore,
}

impl Session {
    /// Load config, apply the global flag overrides, and build the client.
    pub fn open(global: &GlobalOpts) -> Result<Self, CliError> {
        let mut config = vcloud_config::load_config()?;
        if let Some(timeout) = global.timeout {
            config.timeout = timeout;
        }
        if global.insecure {
            config.insecure = true;
        }

        let client = CloudClient::new(config.client_config()?)?;
        let store = config.credential_store();
        Ok(Self {
            config,
            client,
            store,
        })
    }

    /// Install the persisted credential on the client.
    pub fn authenticate(&self) -> Result<Arc<Credential>, CliError> {
        let credential = self.store.load()?;
        Ok(self.client.set_credential(credential))
    }
}

/// Dispatch a network-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(session, args, global).await,
        Command::Logout => auth::logout(session, global),
        Command::Signup(args) => auth::signup(session, args, global).await,
        Command::Me => auth::me(session, global).await,
        Command::ResetPassword(args) => auth::reset_password(session, args, global).await,
        Command::Ssh(args) => ssh::handle(session, args, global).await,
        Command::Apps(args) => apps::handle(session, args, global).await,
        Command::Envs(args) => envs::handle(session, args, global).await,
        Command::Deploy(args) => deploy::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
