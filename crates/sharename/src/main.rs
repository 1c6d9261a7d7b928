mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use sharename_api::ApiClient;
use sharename_config::FileSessionStore;
use sharename_core::{Navigator, SessionGuard};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "sharename", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let settings = config::resolve_settings(&cli.global)?;
            tracing::debug!(
                api_url = %settings.api_url,
                session_file = %settings.session_file.display(),
                "resolved backend"
            );

            let store = Arc::new(FileSessionStore::open(&settings.session_file));
            let client = ApiClient::new(settings.api_url.as_str(), store, &settings.transport)?;

            let navigator = Arc::new(TerminalNavigator {
                location: cmd.location(),
                quiet: cli.global.quiet,
            });
            let guard = SessionGuard::new(navigator).spawn(client.subscribe(), CancellationToken::new());

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &client, &cli.global).await;

            // Dropping the last client closes the event channel; the guard
            // drains what is queued and exits.
            drop(client);
            if let Err(e) = guard.await {
                tracing::warn!(error = %e, "session guard task failed");
            }
            result
        }
    }
}

/// A terminal has no screens to leave; "navigating" to the login page
/// means telling the user their session is gone.
struct TerminalNavigator {
    location: &'static str,
    quiet: bool,
}

impl Navigator for TerminalNavigator {
    fn current_path(&self) -> String {
        self.location.to_owned()
    }

    fn navigate(&self, path: &str) {
        tracing::debug!(path, "session guard redirect");
        output::notice("Your session has expired. Sign in again with: sharename login", self.quiet);
    }
}
