use std::sync::Arc;

use settings_admin::api::auth::AuthClient;
use settings_admin::api::client::SettingsClient;
use settings_admin::api::{build_http, SettingsApi};
use settings_admin::auth::CredentialStore;
use settings_admin::config::AppConfig;
use settings_admin::console::Console;
use settings_admin::{logging, AppError};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("settings-admin: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;

    // Dropping the guard flushes buffered log lines, so it lives until exit.
    let _log_guard = logging::init(&config.log_dir())?;
    logging::install_crash_hook(&config.data_dir);

    tracing::info!(
        api_url = %config.api_url,
        timeout_secs = config.timeout.as_secs(),
        "Starting Settings Admin v{}",
        env!("CARGO_PKG_VERSION")
    );

    let http = build_http(config.timeout)?;
    let store = credential_store(&config);
    let validator = Arc::new(AuthClient::new(http.clone(), config.api_url.clone()));

    let probe = SettingsClient::new(http.clone(), config.api_url.clone(), None);
    if let Err(e) = probe.health().await {
        tracing::warn!("Settings service health check failed: {}", e);
    }

    let base_url = config.api_url.clone();
    let console = Console::new(
        store,
        validator,
        Box::new(move |token| {
            Arc::new(SettingsClient::new(http.clone(), base_url.clone(), token)) as Arc<dyn SettingsApi>
        }),
    );
    console.run().await
}

#[cfg(feature = "keyring")]
fn credential_store(_config: &AppConfig) -> Arc<dyn CredentialStore> {
    Arc::new(settings_admin::auth::store::KeyringCredentialStore)
}

#[cfg(not(feature = "keyring"))]
fn credential_store(config: &AppConfig) -> Arc<dyn CredentialStore> {
    Arc::new(settings_admin::auth::FileCredentialStore::new(&config.data_dir))
}
