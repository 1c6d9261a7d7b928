//! Resolve the active backend from the config file, profile, and CLI flags.
//!
//! Persistence lives in `sharename-config`; this module only layers the
//! command-line overrides on top.

use std::time::Duration;

use sharename_api::TlsMode;
use sharename_config::{ClientSettings, Config, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use sharename_config::{config_path, load_config_or_default, save_config};

/// Profile name from `--profile`, the config's default, or `"default"`.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.profile_name(global.profile.as_deref()).to_owned()
}

/// Build client settings from the active profile with flag overrides, or
/// from `--api-url` alone when no profile exists.
pub fn resolve_settings(global: &GlobalOpts) -> Result<ClientSettings, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match (cfg.profiles.get(&profile_name), global.api_url.as_deref()) {
        (Some(profile), _) => profile.clone(),
        (None, Some(url)) => Profile::new(url),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    apply_overrides(profile, &cfg, global)
}

fn apply_overrides(
    mut profile: Profile,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<ClientSettings, CliError> {
    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }

    let mut settings = sharename_config::client_settings(&profile, &cfg.defaults)?;
    if let Some(secs) = global.timeout {
        settings.transport = settings.transport.with_timeout(Duration::from_secs(secs));
    }
    if matches!(settings.transport.tls, TlsMode::DangerAcceptInvalid) {
        tracing::warn!("TLS certificate verification is disabled");
    }
    Ok(settings)
}

pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}
