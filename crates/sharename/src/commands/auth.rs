//! Sign-in, sign-up, and session commands.

use sharename_api::{ApiClient, Role};

use crate::cli::{GlobalOpts, LoginArgs, SignupArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn login(client: &ApiClient, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let email = util::email_or_prompt(args.email)?;
    let password = util::password_or_prompt(args.password)?;

    let role = client.login(&email, &password).await.map_err(|e| {
        if e.is_session_expired() {
            CliError::LoginFailed {
                email: email.clone(),
            }
        } else {
            CliError::from(e)
        }
    })?;
    output::notice(&format!("✓ Signed in as {email} ({role})"), global.quiet);
    Ok(())
}

pub async fn signup(
    client: &ApiClient,
    args: SignupArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let email = util::email_or_prompt(args.email)?;
    let password = util::password_or_prompt(args.password)?;
    let role = Role::from(args.role);

    client.register(&email, &password, role).await?;
    output::notice(&format!("✓ Account created for {email} ({role})"), global.quiet);
    Ok(())
}

pub fn logout(client: &ApiClient, global: &GlobalOpts) -> Result<(), CliError> {
    client.logout()?;
    output::notice("✓ Signed out", global.quiet);
    Ok(())
}

pub async fn whoami(client: &ApiClient, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(client)?;
    let profile = client.my_profile().await?;

    let out = output::render_single(
        &global.output,
        &profile,
        |p| {
            output::detail_lines(&[
                ("Name", Some(p.display_name())),
                ("Email", Some(p.email.clone())),
                ("Role", Some(p.role.to_string())),
                ("Profile", Some(completion(p.profile_completed).into())),
                ("Public", Some(p.is_public_profile.to_string())),
            ])
        },
        |p| p.email.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn refresh(client: &ApiClient, global: &GlobalOpts) -> Result<(), CliError> {
    client.refresh_token().await?;
    output::notice("✓ Access token refreshed", global.quiet);
    Ok(())
}

fn completion(done: bool) -> &'static str {
    if done { "complete" } else { "incomplete" }
}
