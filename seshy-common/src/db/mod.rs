//! Database layer: initialization, row models, and seeding

pub mod init;
pub mod models;
pub mod seed;

pub use init::init_database;
pub use seed::{upsert_default_vibes, VibeSeedSummary, DEFAULT_VIBES};
