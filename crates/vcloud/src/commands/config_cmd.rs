//! Config subcommand handlers.

use dialoguer::{Confirm, Input};
use vcloud_config::{self as config, Config, ConfigError};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let as_toml = toml::to_string_pretty(&cfg).map_err(ConfigError::from)?;
            let out = output::render_single(global.output, &cfg, |_| as_toml.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            let current = config::load_config_or_default();
            eprintln!("vcloud configuration wizard");
            eprintln!("   Config path: {}\n", config::config_path().display());

            let api_url: String = Input::new()
                .with_prompt("API URL")
                .default(current.api_url.clone())
                .interact_text()
                .map_err(prompt_err)?;

            let activity_url: String = Input::new()
                .with_prompt("Activity URL")
                .default(current.activity_url.clone())
                .interact_text()
                .map_err(prompt_err)?;

            let timeout: u64 = Input::new()
                .with_prompt("Request timeout (seconds)")
                .default(current.timeout)
                .interact_text()
                .map_err(prompt_err)?;

            let insecure = Confirm::new()
                .with_prompt("Accept invalid TLS certificates? (development servers only)")
                .default(current.insecure)
                .interact()
                .map_err(prompt_err)?;

            let cfg = Config {
                api_url,
                activity_url,
                timeout,
                insecure,
                ..current
            };
            // Refuse to save something the client cannot use.
            cfg.client_config()?;

            let path = config::save_config(&cfg)?;
            output::success(global, &format!("Configuration saved to {}", path.display()));
            Ok(())
        }

        ConfigCommand::Path => {
            let cfg = config::load_config_or_default();
            let out = format!(
                "config:     {}\ncredential: {}",
                config::config_path().display(),
                cfg.credential_store().path().display()
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
