//! Client wiring and the reconcile loop.

use kegos_gsuite::{DirectoryClient, ServiceAccountKey};
use kegos_keycloak::{KeycloakAdminClient, KeycloakConfig};
use kegos_sync::{CycleDriver, EngineSettings, Reconciler};
use tracing::info;

use crate::config::DaemonConfig;
use crate::error::DaemonResult;

/// Builds both clients and the driver from `config`.
pub fn build(
    config: &DaemonConfig,
) -> DaemonResult<CycleDriver<KeycloakAdminClient, DirectoryClient>> {
    let key = ServiceAccountKey::from_file(&config.gsuite_credentials)?;
    let source = DirectoryClient::new(key, config.gsuite_admin_subject.clone())?;

    let target = KeycloakAdminClient::new(KeycloakConfig::new(
        config.keycloak_uri.clone(),
        config.keycloak_realm.clone(),
        config.keycloak_client_id.clone(),
        config.keycloak_client_secret.clone(),
    )?)?;

    let settings = EngineSettings::builder()
        .parent_group(config.synced_parent_group.clone())
        .source_domain(config.gsuite_domain.clone())
        .page_size(config.page_size)
        .build()?;

    Ok(CycleDriver::new(
        Reconciler::new(target, source, settings),
        config.reconcile_interval,
    )?)
}

/// Builds the driver and runs cycles until the process is terminated.
pub async fn run(config: DaemonConfig) -> DaemonResult<()> {
    let mut driver = build(&config)?;

    info!(
        realm = %config.keycloak_realm,
        domain = %config.gsuite_domain,
        parent_group = %config.synced_parent_group,
        interval = %humantime::format_duration(config.reconcile_interval),
        "starting reconcile loop"
    );
    driver.run_forever().await;
    Ok(())
}
