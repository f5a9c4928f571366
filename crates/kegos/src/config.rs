//! Daemon configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::cli::Cli;

/// Minimum severity of emitted log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug and above.
    Debug,
    /// Info and above.
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the level as an `EnvFilter` directive.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Every configuration problem found in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(pub Vec<String>);

impl ConfigErrors {
    /// Returns the individual violations.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error: Invalid arguments:")?;
        for violation in &self.0 {
            writeln!(f, "  * {violation}")?;
        }
        writeln!(f)?;
        writeln!(f, "Use --help for usage information.")
    }
}

impl std::error::Error for ConfigErrors {}

/// Validated daemon configuration.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Service-account key file.
    pub gsuite_credentials: PathBuf,
    /// Google Workspace domain.
    pub gsuite_domain: String,
    /// Delegated admin to impersonate.
    pub gsuite_admin_subject: Option<String>,
    /// Keycloak base URL.
    pub keycloak_uri: String,
    /// Keycloak realm.
    pub keycloak_realm: String,
    /// Keycloak client ID.
    pub keycloak_client_id: String,
    /// Keycloak client secret.
    pub keycloak_client_secret: SecretString,
    /// Managed parent group name.
    pub synced_parent_group: String,
    /// Delay between cycles.
    pub reconcile_interval: Duration,
    /// Log level.
    pub log_level: LogLevel,
    /// Log format.
    pub log_format: LogFormat,
    /// Keycloak page size.
    pub page_size: usize,
}

impl DaemonConfig {
    /// Validates the parsed arguments, collecting every violation.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigErrors> {
        let mut errors = Vec::new();

        let gsuite_credentials = required(cli.gsuite_credentials, "--gsuite-credentials", &mut errors);
        let gsuite_domain = required(cli.gsuite_domain, "--gsuite-domain", &mut errors);
        let keycloak_realm = required(cli.keycloak_realm, "--keycloak-realm", &mut errors);
        let keycloak_uri = required(cli.keycloak_uri, "--keycloak-uri", &mut errors);
        let keycloak_client_id = required(cli.keycloak_client_id, "--keycloak-client-id", &mut errors);
        let keycloak_client_secret =
            required(cli.keycloak_client_secret, "--keycloak-client-secret", &mut errors);
        let synced_parent_group =
            required(cli.synced_parent_group, "--synced-parent-group", &mut errors);
        let gsuite_admin_subject = cli.gsuite_admin_subject.filter(|s| !s.is_empty());

        if let Some(uri) = keycloak_uri.as_deref() {
            if !(uri.starts_with("http://") || uri.starts_with("https://")) {
                errors.push("--keycloak-uri must be an absolute http(s) URL".to_string());
            }
        }

        if let Some(group) = synced_parent_group.as_deref() {
            if group.contains('/') {
                errors.push("--synced-parent-group must not contain '/'".to_string());
            }
        }

        let log_level = cli.log_level.parse::<LogLevel>().ok();
        if log_level.is_none() {
            errors.push("--log-level must be one of: debug, info, warn, error".to_string());
        }

        let log_format = cli.log_format.parse::<LogFormat>().ok();
        if log_format.is_none() {
            errors.push("--log-format must be one of: json, text".to_string());
        }

        let reconcile_interval = match humantime::parse_duration(&cli.reconcile_interval) {
            Ok(interval) if interval.is_zero() => {
                errors.push("--reconcile-interval must be positive".to_string());
                None
            }
            Ok(interval) => Some(interval),
            Err(e) => {
                errors.push(format!("--reconcile-interval must be a duration such as 10m: {e}"));
                None
            }
        };

        let page_size = match cli.page_size.parse::<usize>() {
            Ok(size) if size > 0 => Some(size),
            _ => {
                errors.push("--page-size must be a positive integer".to_string());
                None
            }
        };

        if let Some(path) = gsuite_credentials.as_deref() {
            if !Path::new(path).is_file() {
                errors.push(format!("GSuite credentials file does not exist: {path}"));
            }
        }

        match (
            gsuite_credentials,
            gsuite_domain,
            keycloak_uri,
            keycloak_realm,
            keycloak_client_id,
            keycloak_client_secret,
            synced_parent_group,
            reconcile_interval,
            log_level,
            log_format,
            page_size,
        ) {
            (
                Some(gsuite_credentials),
                Some(gsuite_domain),
                Some(keycloak_uri),
                Some(keycloak_realm),
                Some(keycloak_client_id),
                Some(keycloak_client_secret),
                Some(synced_parent_group),
                Some(reconcile_interval),
                Some(log_level),
                Some(log_format),
                Some(page_size),
            ) if errors.is_empty() => Ok(Self {
                gsuite_credentials: PathBuf::from(gsuite_credentials),
                gsuite_domain,
                gsuite_admin_subject,
                keycloak_uri,
                keycloak_realm,
                keycloak_client_id,
                keycloak_client_secret: SecretString::from(keycloak_client_secret),
                synced_parent_group,
                reconcile_interval,
                log_level,
                log_format,
                page_size,
            }),
            _ => Err(ConfigErrors(errors)),
        }
    }
}

fn required(value: Option<String>, flag: &str, errors: &mut Vec<String>) -> Option<String> {
    let value = value.filter(|v| !v.trim().is_empty());
    if value.is_none() {
        errors.push(format!("{flag} is required"));
    }
    value
}
