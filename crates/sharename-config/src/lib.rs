//! Shared configuration for sharename hosts.
//!
//! TOML profiles merged with environment overrides, translation to the
//! API client's transport settings, and the on-disk session store.

mod session;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use sharename_api::{TlsMode, TransportConfig};

pub use session::{FileSessionStore, SESSION_FILE_ENV, resolve_session_file, session_path};

/// Overrides the config file location.
pub const CONFIG_FILE_ENV: &str = "SHARENAME_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit choice, then the configured
    /// default, then `"default"`.
    pub fn profile_name<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (e.g., "https://sharename.example.com/api/").
    pub api_url: String,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Session file for this profile, instead of the shared one.
    pub session_file: Option<PathBuf>,
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ca_cert: None,
            insecure: None,
            timeout: None,
            session_file: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "sharename", "sharename")
}

/// Resolve the config file path: `SHARENAME_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_FILE_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("sharename");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, still honoring `SHARENAME_*` overrides
/// (nested keys separated by `__`, e.g. `SHARENAME_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SHARENAME_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Client settings ─────────────────────────────────────────────────

/// Everything needed to construct an `ApiClient` for one profile.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_url: Url,
    pub transport: TransportConfig,
    pub session_file: PathBuf,
}

/// Resolve a profile against the global defaults.
pub fn client_settings(profile: &Profile, defaults: &Defaults) -> Result<ClientSettings, ConfigError> {
    let api_url = parse_api_url(&profile.api_url)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ClientSettings {
        api_url,
        transport: TransportConfig::default()
            .with_timeout(timeout)
            .with_tls(tls),
        session_file: resolve_session_file(profile.session_file.as_deref()),
    })
}

/// Parse and validate an API base URL. Only http(s) is accepted.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // Loading merges process env, so every load runs inside a Jail.

    #[test]
    fn save_then_load_round_trips_profiles() {
        figment::Jail::expect_with(|jail| {
            let path = jail.directory().join("nested").join("config.toml");

            let mut cfg = Config::default();
            let mut profile = Profile::new("https://share.example.com/api/");
            profile.timeout = Some(10);
            cfg.profiles.insert("work".into(), profile);
            cfg.default_profile = Some("work".into());
            save_config_to(&cfg, &path).unwrap();

            let loaded = load_config_from(&path).unwrap();
            assert_eq!(loaded, cfg);
            assert_eq!(loaded.profile_name(None), "work");
            assert_eq!(loaded.profile("work").unwrap().timeout, Some(10));
            assert!(matches!(
                loaded.profile("home"),
                Err(ConfigError::UnknownProfile { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        figment::Jail::expect_with(|_jail| {
            let cfg = load_config_from(Path::new("absent.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.profile_name(Some("other")), "other");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [defaults]
                timeout = 12
                output = "json"
                "#,
            )?;
            jail.set_env("SHARENAME_DEFAULTS__TIMEOUT", "45");
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.defaults.timeout, 45);
            assert_eq!(cfg.defaults.output, "json");
            Ok(())
        });
    }

    #[test]
    fn client_settings_resolve_profile_over_defaults() {
        let defaults = Defaults::default();
        let mut profile = Profile::new("https://share.example.com/api/");
        profile.ca_cert = Some("/etc/ca.pem".into());

        let settings = client_settings(&profile, &defaults).unwrap();
        assert_eq!(settings.transport.timeout, Duration::from_secs(30));
        assert!(matches!(settings.transport.tls, TlsMode::CustomCa(_)));

        profile.insecure = Some(true);
        profile.timeout = Some(5);
        let settings = client_settings(&profile, &defaults).unwrap();
        assert!(matches!(settings.transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(settings.transport.timeout, Duration::from_secs(5));
    }

    #[test]
    fn api_url_validation() {
        assert!(parse_api_url("https://share.example.com/api/").is_ok());
        assert!(matches!(
            parse_api_url("not a url"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            parse_api_url("ftp://share.example.com/"),
            Err(ConfigError::Validation { .. })
        ));
    }
}
