//! Command dispatch.

pub mod auth;
pub mod codes;
pub mod config_cmd;
pub mod consent;
pub mod contexts;
pub mod dashboard;
pub mod notifications;
pub mod profile;
pub mod redemptions;
pub mod search;
pub mod util;

use sharename_api::ApiClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a command that needs a backend connection to its handler.
pub async fn dispatch(cmd: Command, client: &ApiClient, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(client, args, global).await,
        Command::Signup(args) => auth::signup(client, args, global).await,
        Command::Logout => auth::logout(client, global),
        Command::Whoami => auth::whoami(client, global).await,
        Command::Refresh => auth::refresh(client, global).await,
        Command::Contexts(args) => contexts::handle(client, args, global).await,
        Command::Codes(args) => codes::handle(client, args, global).await,
        Command::Redemptions(args) => redemptions::handle(client, args, global).await,
        Command::Consent(args) => consent::handle(client, args, global).await,
        Command::Notifications(args) => notifications::handle(client, args, global).await,
        Command::Profile(args) => profile::handle(client, args, global).await,
        Command::Search { query } => search::handle(client, &query, global).await,
        Command::Dashboard(args) => dashboard::handle(client, args, global).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
