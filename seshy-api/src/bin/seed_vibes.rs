//! seed-vibes - run the system vibe reconciliation against a database and exit
//!
//! Useful for provisioning a database ahead of first boot, or for re-running
//! the reconciliation after editing the canonical catalog.

use anyhow::Result;
use clap::Parser;
use seshy_common::config::resolve_database_path;
use seshy_common::db::{init_database, upsert_default_vibes};

#[derive(Parser, Debug)]
#[command(name = "seed-vibes", version, about = "Seed the Seshy system vibe catalog")]
struct Args {
    /// Path to the SQLite database file
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let db_path = resolve_database_path(args.database.as_deref(), "SESHY_DATABASE")?;
    let pool = init_database(&db_path).await?;

    let summary = upsert_default_vibes(&pool).await?;
    println!("{}", summary);

    Ok(())
}
