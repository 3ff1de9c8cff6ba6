//! Deploy an environment and follow its activity channel.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use vcloud_api::{ActivityEvent, ListenOptions, StreamEnd};

use crate::cli::{DeployArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Session;

pub async fn handle(session: &Session, args: DeployArgs, global: &GlobalOpts) -> Result<(), CliError> {
    session.authenticate()?;
    let envs = session.client.environments()?;

    let env = envs.fetch(args.environment).await?;
    let branch = args.branch.as_deref().unwrap_or(&env.default_branch);
    let activity = envs.deploy(&env, Some(branch)).await?;
    output::success(global, &format!("Deploying {} from branch {branch}", env.slug));

    // Ctrl-C stops following the activity; the deploy itself keeps going.
    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let mut options = ListenOptions::default().with_cancel(cancel);
    if let Some(limit) = session.config.deploy_timeout() {
        options = options.with_timeout(limit);
    }

    let spinner = spinner(global);
    let result = session
        .client
        .activity()
        .listen_with(activity.id, options, |event| match event {
            ActivityEvent::Connected => spinner.set_message(format!("{} deploying", env.slug)),
            ActivityEvent::Message(line) => {
                spinner.suspend(|| output::print_output(&line, global.quiet));
            }
            ActivityEvent::Closed => spinner.finish_and_clear(),
        })
        .await;
    ctrl_c.abort();
    spinner.finish_and_clear();

    match result? {
        StreamEnd::Closed => {
            output::success(global, "Activity stream closed");
            Ok(())
        }
        StreamEnd::Cancelled => Err(CliError::Interrupted),
        StreamEnd::TimedOut => Err(CliError::Timeout {
            seconds: session.config.deploy_timeout.unwrap_or_default(),
        }),
    }
}

fn spinner(global: &GlobalOpts) -> ProgressBar {
    if global.quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message("connecting to activity channel");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
