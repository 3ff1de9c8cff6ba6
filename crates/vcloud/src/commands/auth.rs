//! Account command handlers: login, logout, signup, me, reset-password.

use vcloud_api::{CloudUser, NewUser};

use crate::cli::{GlobalOpts, LoginArgs, ResetPasswordArgs, SignupArgs};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

pub async fn login(session: &Session, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let email = util::value_or_prompt(args.email, "Email")?;
    let password = util::password_or_prompt(args.password)?;

    let credential = session.client.login(&email, &password).await?;
    session.store.save(&credential)?;

    output::success(
        global,
        &format!(
            "Logged in as {email} (session valid until {})",
            credential.expires_at.format("%Y-%m-%d %H:%M UTC")
        ),
    );
    Ok(())
}

pub fn logout(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    session.client.clear_credential();
    if session.store.discard()? {
        output::success(global, "Logged out");
    } else {
        output::notice(global, "Not logged in");
    }
    Ok(())
}

pub async fn signup(session: &Session, args: SignupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let password = util::password_or_prompt(args.password)?;
    let new_user = NewUser {
        email: args.email,
        first_name: args.first_name,
        last_name: args.last_name,
        organization_name: args.organization,
        password,
    };

    let user = session.client.users().signup(&new_user).await?;
    output::success(global, &format!("Account created for {}; run: vcloud login", user.email));
    Ok(())
}

pub async fn me(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    session.authenticate()?;
    let user = session.client.users().me().await?;
    let out = output::render_single(global.output, &user, detail)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn reset_password(
    session: &Session,
    args: ResetPasswordArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    session.client.users().reset_password(&args.email).await?;
    output::success(global, &format!("Password reset instructions sent to {}", args.email));
    Ok(())
}

fn detail(user: &CloudUser) -> String {
    format!(
        "Name:   {} {}\nEmail:  {}\nID:     {}",
        user.first_name, user.last_name, user.email, user.id
    )
}
