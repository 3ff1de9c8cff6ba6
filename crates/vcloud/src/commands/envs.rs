//! Environment command handlers.

use tabled::Tabled;
use vcloud_api::CloudEnv;

use crate::cli::{EnvsArgs, EnvsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Tabled)]
struct EnvRow {
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Branch")]
    branch: String,
    #[tabled(rename = "Application")]
    application: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn to_row(e: &CloudEnv) -> EnvRow {
    EnvRow {
        slug: e.slug.clone(),
        branch: e.default_branch.clone(),
        application: e.application_id.to_string(),
        id: e.id.to_string(),
    }
}

pub async fn handle(session: &Session, args: EnvsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    session.authenticate()?;
    let envs = session.client.environments()?;

    match args.command {
        EnvsCommand::List { app } => {
            let list = match app {
                Some(app_id) => envs.list_for_application(app_id).await?,
                None => envs.list().await?,
            };
            let out = output::render_list(global.output, &list, to_row)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
