//! Shared helpers for command handlers.

use secrecy::SecretString;

use crate::error::CliError;

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Use the flag value, or prompt for a line of input.
pub fn value_or_prompt(value: Option<String>, prompt: &str) -> Result<String, CliError> {
    match value {
        Some(v) => Ok(v),
        None => dialoguer::Input::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(prompt_err),
    }
}

/// Use the flag value, or read a password without echo.
pub fn password_or_prompt(value: Option<String>) -> Result<SecretString, CliError> {
    let raw = match value {
        Some(v) => v,
        None => rpassword::prompt_password("Password: ").map_err(prompt_err)?,
    };
    if raw.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(raw))
}
