//! Config subcommand handlers.

use dialoguer::{Input, Select};
use sharename_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

/// Config as TOML-ish text, profiles sorted by name.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let Some(p) = cfg.profiles.get(name) else { continue };
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref session) = p.session_file {
            let _ = writeln!(out, "session_file = \"{}\"", session.display());
        }
    }

    out.trim_end().to_owned()
}

fn parse_flag<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("sharename -- configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("API base URL")
                .default("http://localhost:8000/api/".into())
                .interact_text()
                .map_err(prompt_err)?;
            sharename_config::parse_api_url(&api_url)?;

            let tls_choices = &[
                "Verify certificates (recommended)",
                "Accept any certificate (local development only)",
            ];
            let tls_selection = Select::new()
                .with_prompt("TLS verification")
                .items(tls_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let mut profile = Profile::new(api_url);
            if tls_selection == 1 {
                profile.insecure = Some(true);
            }

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Sign in with: sharename login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(String::new()));

            match key.as_str() {
                "api_url" | "api-url" => {
                    sharename_config::parse_api_url(&value)?;
                    profile.api_url = value;
                }
                "insecure" => profile.insecure = Some(parse_flag("insecure", &value, "'true' or 'false'")?),
                "timeout" => profile.timeout = Some(parse_flag("timeout", &value, "a number (seconds)")?),
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "session_file" | "session-file" => profile.session_file = Some(value.into()),
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: api_url, insecure, \
                             timeout, ca_cert, session_file"
                        ),
                    });
                }
            }

            config::save_config(&cfg)?;
            output::notice(&format!("✓ Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: sharename config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_config_lists_profiles_in_order() {
        let mut cfg = Config::default();
        cfg.profiles.insert("work".into(), Profile::new("https://b.example/api/"));
        let mut local = Profile::new("http://localhost:8000/api/");
        local.insecure = Some(true);
        cfg.profiles.insert("local".into(), local);

        let text = format_config(&cfg);
        let local_at = text.find("[profiles.local]");
        let work_at = text.find("[profiles.work]");
        assert!(local_at.is_some() && work_at.is_some());
        assert!(local_at < work_at);
        assert!(text.contains("insecure = true"));
        assert!(text.starts_with("default_profile = \"default\""));
    }

    #[test]
    fn flags_parse_or_explain() {
        assert!(matches!(parse_flag::<u64>("timeout", "12", "a number"), Ok(12)));
        let err = parse_flag::<bool>("insecure", "maybe", "'true' or 'false'");
        assert!(matches!(err, Err(CliError::Validation { .. })));
    }
}
