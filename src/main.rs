use coupon_dispatch::{
    api::{AppState, create_router},
    config::{self, PartnerCredentials, database},
    core::{
        catalog_sync::{self, SyncOutcome},
        product,
    },
    errors::{Error, Result},
    partner::PartnerClient,
};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: coupon-dispatch [serve|sync]";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Open the database and make sure the tables exist
    let db = database::create_connection(&app_config.database.url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    match std::env::args().nth(1).as_deref() {
        None | Some("serve") => {
            product::seed_products_if_empty(&db, &app_config.products)
                .await
                .inspect_err(|e| error!("Failed to seed products: {}", e))?;

            let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("Coupon dispatch API listening on http://{}", addr);

            axum::serve(listener, create_router(AppState::new(db))).await?;
        }
        Some("sync") => {
            // Credentials are read directly before use, never stored in AppConfig
            let credentials = PartnerCredentials::from_env()
                .inspect_err(|e| error!("Cannot sync catalog: {}", e))?;
            let client = PartnerClient::new(&app_config.partner, credentials)?;

            // A failed sync leaves the catalog untouched and is not a process failure
            match catalog_sync::run_catalog_sync(&db, &client).await {
                SyncOutcome::Synced { count } => info!("Sync mode done, {} products", count),
                SyncOutcome::Failed { reason } => warn!("Sync mode done, catalog kept: {}", reason),
            }
        }
        Some(other) => {
            return Err(Error::Config {
                message: format!("unknown mode `{other}`; {USAGE}"),
            });
        }
    }

    Ok(())
}
