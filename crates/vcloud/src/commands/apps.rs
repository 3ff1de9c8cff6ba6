//! Application command handlers.

use tabled::Tabled;
use vcloud_api::CloudApp;

use crate::cli::{AppsArgs, AppsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Repository")]
    repository: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn to_row(a: &CloudApp) -> AppRow {
    AppRow {
        name: a.name.clone(),
        slug: a.slug.clone(),
        repository: a.github.clone().unwrap_or_else(|| a.git_url.clone()),
        id: a.id.to_string(),
    }
}

pub async fn handle(session: &Session, args: AppsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    session.authenticate()?;
    let apps = session.client.applications()?;

    match args.command {
        AppsCommand::List => {
            let list = apps.list().await?;
            let out = output::render_list(global.output, &list, to_row)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AppsCommand::Show { slug } => {
            let app = apps.find_by_slug(&slug).await?.ok_or_else(|| CliError::NotFound {
                resource_type: "application".into(),
                identifier: slug,
                list_command: "apps list".into(),
            })?;
            let out = output::render_single(global.output, &app, detail)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

fn detail(app: &CloudApp) -> String {
    format!(
        "Name:       {}\nSlug:       {}\nNamespace:  {}\nRepository: {}\nID:         {}",
        app.name,
        app.slug,
        app.namespace,
        app.github.as_deref().unwrap_or(&app.git_url),
        app.id
    )
}
