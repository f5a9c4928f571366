//! CLI argument parsing.
//!
//! Every option can also be set through its environment variable. Values are
//! kept as raw strings here; [`DaemonConfig::from_cli`](crate::config::DaemonConfig::from_cli)
//! validates all of them at once so the user sees every problem in one run.

use clap::Parser;

/// kegos - sync Google Workspace group memberships into Keycloak.
#[derive(Debug, Parser)]
#[command(name = "kegos")]
#[command(author, version, about, long_about = None)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Path to the Google service-account JSON credentials file (required).
    #[arg(long, env = "GSUITE_CREDENTIALS")]
    pub gsuite_credentials: Option<String>,

    /// Google Workspace domain (required).
    #[arg(long, env = "GSUITE_DOMAIN")]
    pub gsuite_domain: Option<String>,

    /// Admin user to impersonate through domain-wide delegation.
    #[arg(long, env = "GSUITE_ADMIN_SUBJECT")]
    pub gsuite_admin_subject: Option<String>,

    /// Keycloak base URL (required).
    #[arg(long, env = "KEYCLOAK_URI")]
    pub keycloak_uri: Option<String>,

    /// Keycloak realm (required).
    #[arg(long, env = "KEYCLOAK_REALM")]
    pub keycloak_realm: Option<String>,

    /// Keycloak client ID (required).
    #[arg(long, env = "KEYCLOAK_CLIENT_ID")]
    pub keycloak_client_id: Option<String>,

    /// Keycloak client secret (required).
    #[arg(long, env = "KEYCLOAK_CLIENT_SECRET", hide_env_values = true)]
    pub keycloak_client_secret: Option<String>,

    /// Keycloak group where the Google groups are synced (required).
    #[arg(long, env = "SYNCED_PARENT_GROUP")]
    pub synced_parent_group: Option<String>,

    /// Delay between two reconcile loops.
    #[arg(long, env = "RECONCILE_INTERVAL", default_value = "10m")]
    pub reconcile_interval: String,

    /// Log level (debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log format (json, text).
    #[arg(long, env = "LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Page size used when listing Keycloak users and groups.
    #[arg(long, env = "PAGE_SIZE", default_value = "100")]
    pub page_size: String,
}
