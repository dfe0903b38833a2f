//! Database initialization
//!
//! Creates the full schema on first run and is safe to call on every boot:
//! all statements are `CREATE TABLE IF NOT EXISTS` / `INSERT OR IGNORE`.

use crate::Result;
use crate::ANONYMOUS_PROFILE_ID;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    // Schema creation (idempotent - safe to call multiple times)
    create_public_profiles_table(&pool).await?;
    create_user_settings_table(&pool).await?;
    create_user_logins_table(&pool).await?;
    create_places_table(&pool).await?;
    create_vibes_table(&pool).await?;
    create_event_items_table(&pool).await?;
    create_event_vibes_table(&pool).await?;
    create_members_table(&pool).await?;
    create_invites_table(&pool).await?;
    create_media_table(&pool).await?;
    create_user_notifications_table(&pool).await?;
    create_tickets_table(&pool).await?;
    create_payments_table(&pool).await?;

    Ok(pool)
}

async fn create_public_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS public_profiles (
            id TEXT PRIMARY KEY,
            avatar_url TEXT,
            username TEXT UNIQUE,
            display_name TEXT NOT NULL,
            bio TEXT,
            age_years INTEGER,
            gender TEXT,
            reputation_score INTEGER NOT NULL DEFAULT 0,
            is_verified INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at TIMESTAMP,
            CHECK (age_years IS NULL OR (age_years >= 0 AND age_years < 150)),
            CHECK (reputation_score >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_public_profiles_username ON public_profiles(username)")
        .execute(pool)
        .await?;

    // Create the anonymous bootstrap profile if it doesn't exist.
    // The auth stub resolves all requests to this profile.
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO public_profiles (id, username, display_name, reputation_score)
        VALUES (?, 'anonymous', 'Anonymous', 0)
        "#,
    )
    .bind(ANONYMOUS_PROFILE_ID.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_user_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_settings (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE REFERENCES public_profiles(id),
            appearance_mode INTEGER NOT NULL DEFAULT 0,
            map_style INTEGER NOT NULL DEFAULT 0,
            map_center_latitude REAL NOT NULL DEFAULT 0.0,
            map_center_longitude REAL NOT NULL DEFAULT 0.0,
            map_zoom_level REAL NOT NULL DEFAULT 10.0,
            map_start_date TIMESTAMP,
            map_end_date TIMESTAMP,
            map_max_distance REAL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (appearance_mode IN (0, 1, 2)),
            CHECK (map_style >= 0 AND map_style <= 5)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_user_logins_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_logins (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE REFERENCES public_profiles(id),
            phone_hash TEXT NOT NULL,
            phone_verified_at TIMESTAMP,
            email_hash TEXT,
            email_verified_at TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_logins_phone ON user_logins(phone_hash)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_logins_email ON user_logins(email_hash)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_places_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS places (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            details TEXT,
            street_address TEXT,
            city TEXT,
            state_region TEXT,
            room_number TEXT,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            radius REAL NOT NULL,
            max_capacity INTEGER,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at TIMESTAMP,
            CHECK (latitude >= -90.0 AND latitude <= 90.0),
            CHECK (longitude >= -180.0 AND longitude <= 180.0),
            CHECK (radius >= 0.0),
            CHECK (max_capacity IS NULL OR max_capacity >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the vibes table
///
/// System-defined rows are owned by the seeding reconciler; user rows are
/// created through the API. The unique slug index is what makes concurrent
/// seeding benign.
pub async fn create_vibes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vibes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            category INTEGER NOT NULL DEFAULT 0,
            system_defined INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at TIMESTAMP,
            CHECK (category >= 0 AND category <= 7)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_vibes_slug ON vibes(slug)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_event_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event_items (
            id TEXT PRIMARY KEY,
            status INTEGER NOT NULL DEFAULT 0,
            name TEXT NOT NULL,
            details TEXT,
            brand_color TEXT NOT NULL,
            start_time TIMESTAMP,
            end_time TIMESTAMP,
            duration_minutes INTEGER,
            is_all_day INTEGER NOT NULL DEFAULT 0,
            location_id TEXT REFERENCES places(id),
            max_capacity INTEGER NOT NULL DEFAULT 0,
            visibility INTEGER NOT NULL DEFAULT 0,
            invite_link TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at TIMESTAMP,
            CHECK (status >= 0 AND status <= 3),
            CHECK (visibility >= 0 AND visibility <= 3),
            CHECK (max_capacity >= 0),
            CHECK (start_time IS NULL OR end_time IS NULL OR start_time < end_time)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_event_items_start_time ON event_items(start_time)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_event_vibes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event_vibes (
            event_id TEXT NOT NULL REFERENCES event_items(id) ON DELETE CASCADE,
            vibe_id TEXT NOT NULL REFERENCES vibes(id) ON DELETE CASCADE,
            PRIMARY KEY (event_id, vibe_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_members_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY,
            role INTEGER NOT NULL DEFAULT 2,
            user_id TEXT NOT NULL REFERENCES public_profiles(id),
            display_name TEXT NOT NULL,
            username TEXT,
            avatar_url TEXT,
            event_id TEXT NOT NULL REFERENCES event_items(id) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at TIMESTAMP,
            CHECK (role IN (0, 1, 2))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_members_event ON members(event_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_members_user ON members(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_invites_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS invites (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES public_profiles(id),
            type INTEGER NOT NULL DEFAULT 0,
            status INTEGER NOT NULL DEFAULT 0,
            token TEXT UNIQUE,
            expires_at TIMESTAMP,
            event_id TEXT NOT NULL REFERENCES event_items(id) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at TIMESTAMP,
            CHECK (type IN (0, 1)),
            CHECK (status >= 0 AND status <= 4)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_invites_event ON invites(event_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_invites_token ON invites(token)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_media_table(pool: &SqlitePool) -> Result<()> {
    // Exactly one owner: event, user profile, or public profile
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS media (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            mime_type TEXT,
            average_color_hex TEXT,
            event_id TEXT REFERENCES event_items(id) ON DELETE CASCADE,
            user_profile_id TEXT REFERENCES public_profiles(id),
            public_profile_id TEXT REFERENCES public_profiles(id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at TIMESTAMP,
            CHECK (position >= 0),
            CHECK ((event_id IS NOT NULL) + (user_profile_id IS NOT NULL) + (public_profile_id IS NOT NULL) = 1)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_media_event ON media(event_id, position)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_user_notifications_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_notifications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES public_profiles(id),
            type INTEGER NOT NULL,
            timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            is_unread INTEGER NOT NULL DEFAULT 1,
            user_name TEXT,
            user_avatar TEXT,
            event_name TEXT,
            event_id TEXT REFERENCES event_items(id),
            event_color TEXT,
            title TEXT NOT NULL,
            subtitle TEXT,
            metadata TEXT,
            primary_action TEXT,
            secondary_action TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (type >= 0 AND type <= 5)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_notifications_user ON user_notifications(user_id, is_unread)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_tickets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tickets (
            id TEXT PRIMARY KEY,
            event_id TEXT NOT NULL REFERENCES event_items(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            price_cents INTEGER NOT NULL,
            quantity INTEGER NOT NULL,
            sold INTEGER NOT NULL DEFAULT 0,
            expires_at TIMESTAMP,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (price_cents >= 0),
            CHECK (quantity >= 1),
            CHECK (sold >= 0 AND sold <= quantity)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tickets_event ON tickets(event_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_payments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY,
            ticket_id TEXT NOT NULL REFERENCES tickets(id),
            user_id TEXT NOT NULL REFERENCES public_profiles(id),
            status TEXT NOT NULL CHECK (status IN ('pending', 'succeeded', 'failed', 'refunded')),
            amount_cents INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (amount_cents >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_payments_user ON payments(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}
