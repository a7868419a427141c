use anyhow::Context;
use fyyur_backend::{app_router, db, logging, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let _log_guard = logging::init_logging(config.log_dir.as_deref())?;

    if config.run_migrations {
        let applied = db::run_migrations(&config.database_url).await?;
        tracing::info!("Applied {} pending migration(s)", applied);
    }

    // Establish database connection pool
    let pool = db::establish_connection_pool(&config.database_url, config.db_pool_size)?;

    if !config.static_dir.exists() {
        tracing::warn!(
            "Static directory {} not found, assets will 404",
            config.static_dir.display()
        );
    }

    let app = app_router(pool, &config.static_dir);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
