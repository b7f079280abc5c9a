use anyhow::Result;
use clap::Parser;
use pkgx_api::{create_app, Config};
use pkgx_registry::db::{backup_database, create_pool, run_migrations};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Package registry HTTP API
#[derive(Debug, Parser)]
#[command(name = "pkgx-api", version, about)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "PKGX_API_BIND")]
    bind: Option<String>,

    /// Path to the SQLite registry database
    #[arg(long, env = "PKGX_API_DB_PATH")]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("pkgx_api=debug,pkgx_registry=debug,pkgx_search=info,tower_http=debug")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting pkgx-api service...");

    // Load configuration
    let config = Config::from_env().with_overrides(cli.bind, cli.db_path);
    info!(
        "Configuration loaded: bind_addr={}, db_path={}",
        config.bind_addr,
        config.db_path.display()
    );

    // Backup before migrations
    let db_path = &config.db_path;
    if db_path.exists() {
        let backup_path = backup_database(db_path)?;
        info!("Database backed up to: {}", backup_path.display());
    }

    // Create pool and run migrations
    let pool = create_pool(db_path).await?;
    info!("Running database migrations...");
    run_migrations(&pool).await?;
    info!("Migrations complete");

    let app = create_app(pool).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
