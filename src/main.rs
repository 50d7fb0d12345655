use std::sync::Arc;

use cycletrack::config::AppConfig;
use cycletrack::error::AppError;
use cycletrack::routes::create_router;
use cycletrack::services::{ride_store::RideStore, storage::JsonFileStorage};
use cycletrack::state::AppState;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;

    let storage = JsonFileStorage::new(config.data_dir.clone(), &config.storage_key);
    storage.ensure_structure().await?;
    info!("rides stored at {}", storage.entry_path().display());

    let store = match RideStore::hydrate(Arc::new(storage), config.corrupt_store_policy).await {
        Ok(store) => store,
        Err(err) => {
            error!("could not load stored rides: {err}");
            return Err(err);
        }
    };

    let state = AppState::new(store);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,cycletrack=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
