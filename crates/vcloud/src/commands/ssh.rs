//! SSH key command handlers.

use std::path::Path;

use tabled::Tabled;
use vcloud_api::SshKey;

use crate::cli::{GlobalOpts, SshArgs, SshCommand};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

#[derive(Tabled)]
struct SshKeyRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn to_row(k: &SshKey) -> SshKeyRow {
    SshKeyRow {
        name: k.name.clone(),
        key: abbreviate_key(&k.key),
        created: output::short_date(k.created_at.as_deref()),
        id: k.id.to_string(),
    }
}

pub async fn handle(session: &Session, args: SshArgs, global: &GlobalOpts) -> Result<(), CliError> {
    session.authenticate()?;
    let keys = session.client.ssh_keys()?;

    match args.command {
        SshCommand::Add { name, key, file } => {
            let key = match (key, file) {
                (Some(key), _) => key,
                (None, Some(path)) => read_key_file(&path)?,
                (None, None) => {
                    return Err(CliError::Validation {
                        field: "key".into(),
                        reason: "pass --key or --file".into(),
                    });
                }
            };
            let created = keys.add(&name, key.trim()).await?;
            output::success(global, &format!("Added SSH key '{}' ({})", created.name, created.id));
            Ok(())
        }

        SshCommand::List => {
            let list = keys.list().await?;
            let out = output::render_list(global.output, &list, to_row)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SshCommand::Delete { name } => {
            let list = keys.list().await?;
            let key = select_by_name(&list, &name)?;
            if !util::confirm(&format!("Delete SSH key '{name}'?"), global.yes)? {
                return Ok(());
            }
            keys.delete(key).await?;
            output::success(global, &format!("Deleted SSH key '{name}'"));
            Ok(())
        }
    }
}

fn read_key_file(path: &Path) -> Result<String, CliError> {
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Err(CliError::Validation {
            field: "file".into(),
            reason: format!("{} is empty", path.display()),
        });
    }
    Ok(contents)
}

/// Exactly one key must carry `name`.
fn select_by_name<'a>(keys: &'a [SshKey], name: &str) -> Result<&'a SshKey, CliError> {
    let matches: Vec<&SshKey> = keys.iter().filter(|k| k.name == name).collect();
    match matches.as_slice() {
        [key] => Ok(*key),
        [] => Err(CliError::NotFound {
            resource_type: "SSH key".into(),
            identifier: name.into(),
            list_command: "ssh list".into(),
        }),
        many => Err(CliError::Ambiguous {
            resource_type: "SSH key".into(),
            identifier: name.into(),
            count: many.len(),
        }),
    }
}

/// `ssh-ed25519 AAAAC3Nz…Xk9 user@host` → type, short body, comment.
fn abbreviate_key(key: &str) -> String {
    let mut parts = key.split_whitespace();
    let kind = parts.next().unwrap_or_default();
    let body = parts.next().unwrap_or_default();
    let comment = parts.collect::<Vec<_>>().join(" ");

    let body = if body.chars().count() > 16 {
        let head: String = body.chars().take(8).collect();
        let tail: String = body.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
        format!("{head}…{tail}")
    } else {
        body.to_owned()
    };

    [kind, body.as_str(), comment.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
