//! IT Manager - headless dashboard runner
//!
//! Restores (or opens) a session against the inventory API and loads the
//! equipment screen once, logging what a user would see.

use std::{env, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use itmanager_dashboard::{
    api::HttpApi,
    config::AppConfig,
    services::router::View,
    storage::FileStore,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    init_tracing(&config);

    tracing::info!("Starting IT Manager dashboard v{}", env!("CARGO_PKG_VERSION"));

    let store = FileStore::open(&config.storage.session_file)?;
    tracing::info!("Session store at {}", store.path().display());

    let api = HttpApi::new(&config.api)?;
    tracing::info!("Using API at {}", api.base_url());

    let state = AppState::new(config, Arc::new(api), Arc::new(store));
    let services = &state.services;

    if !services.start() {
        match (env::var("ITMANAGER_USERNAME"), env::var("ITMANAGER_PASSWORD")) {
            (Ok(username), Ok(password)) => {
                if services.sign_in(&username, &password).await.is_err() {
                    report_toast(&state);
                    return Ok(());
                }
            }
            _ => {
                tracing::warn!("Not signed in; set ITMANAGER_USERNAME and ITMANAGER_PASSWORD");
                return Ok(());
            }
        }
    }

    if let Some(user) = services.session.user() {
        tracing::info!("Signed in as {} <{}> ({})", user.full_name, user.email, user.role);
    }

    let menu: Vec<&str> = services.nav_entries().iter().map(|e| e.label).collect();
    tracing::info!("Navigation: {}", menu.join(" | "));

    services.navigate(View::Equipment)?;
    if services.load_equipment_screen().await.is_ok() {
        let types: Vec<String> = services.equipment.types().into_iter().map(|t| t.name).collect();
        tracing::info!("Equipment types: {}", types.join(", "));

        for item in services.equipment.items() {
            tracing::info!(
                "#{} {} {} {} [{}] serial={} status={} assigned_to={}",
                item.id,
                item.inventory_code,
                item.equipment_type,
                item.brand,
                item.model,
                item.serial_number,
                item.status,
                item.assigned_to.as_deref().unwrap_or("-"),
            );
        }
    }
    report_toast(&state);

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let level = &config.logging.level;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("itmanager_dashboard={},itmanager={}", level, level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn report_toast(state: &AppState) {
    if let Some(toast) = state.services.notifications.current() {
        tracing::info!("[{:?}] {}", toast.kind, toast.text);
    }
}
