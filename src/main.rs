use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use process_plan_api::config::Config;
use process_plan_api::external::mes::MesClient;
use process_plan_api::routes;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("Starting server...");

    let config: Config = Config::from_env();

    let db_url = config
        .db_url
        .as_deref()
        .context("DB_URL (or DB_USER and friends) must be set")?;
    let db: DatabaseConnection = Database::connect(db_url)
        .await
        .context("Failed to connect to the database")?;

    if db.ping().await.is_ok() {
        tracing::info!("Connected to the database");
    } else {
        tracing::warn!("Could not connect to the database");
    }

    Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("DB migrations complete");

    let mes = MesClient::new(&config).context("Failed to build MES client")?;

    tracing::info!(
        "Starting server {} ({} deployment), metadata policy {:?}, MES at {}",
        config.app_name,
        config.deployment.to_uppercase(),
        config.metadata_policy,
        config.mes_api_url
    );

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], 3000).into();
    tracing::info!("Listening on {addr}");

    let router = routes::build_router(&db, &config, Arc::new(mes));

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?,
        router.into_make_service(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
