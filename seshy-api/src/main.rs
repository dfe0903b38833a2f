//! seshy-api - REST backend for the Seshy event-planning app
//!
//! Initializes the database schema, reconciles the system vibe catalog, and
//! serves the HTTP API.

use anyhow::Result;
use clap::Parser;
use seshy_common::config::resolve_database_path;
use seshy_common::db::{init_database, upsert_default_vibes};
use seshy_api::{build_router, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "seshy-api", version, about = "Seshy REST API server")]
struct Args {
    /// Path to the SQLite database file
    #[arg(long)]
    database: Option<String>,

    /// Address to bind the HTTP server to
    #[arg(long, env = "SESHY_BIND", default_value = "127.0.0.1:8000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately, before database delays
    info!("Starting Seshy API (seshy-api) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let db_path = resolve_database_path(args.database.as_deref(), "SESHY_DATABASE")?;
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    // Reconcile the system vibe catalog on every boot; safe to run
    // concurrently with other instances.
    let summary = upsert_default_vibes(&pool).await?;
    info!("{}", summary);

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("seshy-api listening on http://{}", args.bind);
    info!("Health check: http://{}/health", args.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
