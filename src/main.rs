use mimalloc::MiMalloc;
use mongodb::Client;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use projectdb_init::config::BootstrapConfig;
use projectdb_init::db::SchemaBootstrap;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = BootstrapConfig::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        mongo_uri = %cfg.mongo_uri,
        database = %cfg.database,
        api_key_present = cfg.api_key.is_some(),
        loglevel = %cfg.loglevel,
        "starting database initialization"
    );

    let client = Client::with_uri_str(&cfg.mongo_uri).await?;
    let bootstrap = SchemaBootstrap::new(client.database(&cfg.database));

    bootstrap.ping_until_ready().await?;
    let report = bootstrap.run(cfg.api_key.as_deref()).await?;

    info!(
        collections_created = report.schema.collections_created,
        indexes_created = report.schema.indexes_created,
        client_seeded = report.client_seeded,
        api_key_seeded = report.api_key_seeded,
        "database initialization complete"
    );
    Ok(())
}
