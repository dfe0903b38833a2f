//! Vibe tag handlers
//!
//! System-defined vibes are owned by the boot-time seeding reconciler and are
//! read-only through the API. Users with enough reputation can add custom
//! vibes, which always land in the `custom` category.

use crate::api::events::{fetch_event, require_manager};
use crate::api::ApiError;
use crate::auth::current_user_id;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use seshy_common::db::models::Vibe;
use seshy_common::domain::VibeCategory;
use serde::Deserialize;
use uuid::Uuid;

const MIN_REPUTATION_FOR_CUSTOM_VIBE: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct VibeListQuery {
    #[serde(default = "default_true")]
    pub active_only: bool,
    #[serde(default)]
    pub system_only: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct VibeCreate {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct VibeUpdate {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Derive a URL-safe slug from a display name: lowercase alphanumeric runs
/// joined by single dashes.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

async fn fetch_vibe(db: &sqlx::SqlitePool, vibe_id: Uuid) -> Result<Vibe, ApiError> {
    sqlx::query_as::<_, Vibe>("SELECT * FROM vibes WHERE id = ? AND deleted_at IS NULL")
        .bind(vibe_id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vibe not found".to_string()))
}

/// GET /vibes
pub async fn list_vibes(
    State(state): State<AppState>,
    Query(query): Query<VibeListQuery>,
) -> Result<Json<Vec<Vibe>>, ApiError> {
    let mut sql = String::from("SELECT * FROM vibes WHERE deleted_at IS NULL");
    if query.active_only {
        sql.push_str(" AND is_active = 1");
    }
    if query.system_only {
        sql.push_str(" AND system_defined = 1");
    }
    sql.push_str(" ORDER BY slug");

    let vibes = sqlx::query_as::<_, Vibe>(&sql).fetch_all(&state.db).await?;
    Ok(Json(vibes))
}

/// POST /vibes
///
/// Custom vibe creation is gated on reputation to keep the tag space from
/// filling with noise.
pub async fn create_vibe(
    State(state): State<AppState>,
    Json(body): Json<VibeCreate>,
) -> Result<(StatusCode, Json<Vibe>), ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ApiError::BadRequest(
            "name must contain at least one alphanumeric character".to_string(),
        ));
    }

    let creator = crate::api::profiles::fetch_profile(&state.db, current_user_id()).await?;
    if creator.reputation_score < MIN_REPUTATION_FOR_CUSTOM_VIBE {
        return Err(ApiError::Forbidden(format!(
            "Creating custom vibes requires a reputation of at least {}",
            MIN_REPUTATION_FOR_CUSTOM_VIBE
        )));
    }

    let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vibes WHERE slug = ?")
        .bind(&slug)
        .fetch_one(&state.db)
        .await?;
    if taken > 0 {
        return Err(ApiError::Conflict(format!("A vibe with slug '{}' already exists", slug)));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO vibes (id, name, slug, category, system_defined, is_active)
        VALUES (?, ?, ?, ?, 0, 1)
        "#,
    )
    .bind(id.to_string())
    .bind(name)
    .bind(&slug)
    .bind(VibeCategory::Custom)
    .execute(&state.db)
    .await?;

    let vibe = fetch_vibe(&state.db, id).await?;
    Ok((StatusCode::CREATED, Json(vibe)))
}

/// GET /vibes/:vibe_id
pub async fn get_vibe(
    State(state): State<AppState>,
    Path(vibe_id): Path<Uuid>,
) -> Result<Json<Vibe>, ApiError> {
    Ok(Json(fetch_vibe(&state.db, vibe_id).await?))
}

/// PUT /vibes/:vibe_id
///
/// Custom vibes only; the slug never changes after creation so event
/// associations and shared links stay valid.
pub async fn update_vibe(
    State(state): State<AppState>,
    Path(vibe_id): Path<Uuid>,
    Json(body): Json<VibeUpdate>,
) -> Result<Json<Vibe>, ApiError> {
    let vibe = fetch_vibe(&state.db, vibe_id).await?;
    if vibe.system_defined {
        return Err(ApiError::Forbidden(
            "System-defined vibes cannot be modified".to_string(),
        ));
    }
    if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }

    sqlx::query(
        r#"
        UPDATE vibes
        SET name = COALESCE(?, name),
            is_active = COALESCE(?, is_active),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(body.name.as_deref().map(str::trim))
    .bind(body.is_active)
    .bind(vibe_id.to_string())
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_vibe(&state.db, vibe_id).await?))
}

/// GET /events/:event_id/vibes
pub async fn list_event_vibes(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Vibe>>, ApiError> {
    fetch_event(&state.db, event_id).await?;

    let vibes = sqlx::query_as::<_, Vibe>(
        r#"
        SELECT v.* FROM vibes v
        JOIN event_vibes ev ON ev.vibe_id = v.id
        WHERE ev.event_id = ? AND v.deleted_at IS NULL
        ORDER BY v.slug
        "#,
    )
    .bind(event_id.to_string())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(vibes))
}

/// POST /vibes/events/:event_id/vibes/:vibe_id
pub async fn add_vibe_to_event(
    State(state): State<AppState>,
    Path((event_id, vibe_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    fetch_event(&state.db, event_id).await?;
    require_manager(&state.db, event_id, current_user_id()).await?;

    let vibe = fetch_vibe(&state.db, vibe_id).await?;
    if !vibe.is_active {
        return Err(ApiError::BadRequest(
            "Inactive vibes cannot be added to events".to_string(),
        ));
    }

    let inserted = sqlx::query(
        "INSERT OR IGNORE INTO event_vibes (event_id, vibe_id) VALUES (?, ?)",
    )
    .bind(event_id.to_string())
    .bind(vibe_id.to_string())
    .execute(&state.db)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(ApiError::Conflict(
            "Vibe is already associated with this event".to_string(),
        ));
    }

    Ok(StatusCode::CREATED)
}

/// DELETE /vibes/events/:event_id/vibes/:vibe_id
pub async fn remove_vibe_from_event(
    State(state): State<AppState>,
    Path((event_id, vibe_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    fetch_event(&state.db, event_id).await?;
    require_manager(&state.db, event_id, current_user_id()).await?;

    let removed = sqlx::query("DELETE FROM event_vibes WHERE event_id = ? AND vibe_id = ?")
        .bind(event_id.to_string())
        .bind(vibe_id.to_string())
        .execute(&state.db)
        .await?;

    if removed.rows_affected() == 0 {
        return Err(ApiError::NotFound(
            "Vibe is not associated with this event".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("House Party"), "house-party");
        assert_eq!(slugify("  Deep   House!! Sessions "), "deep-house-sessions");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn slugify_strips_non_alphanumeric() {
        assert_eq!(slugify("???"), "");
        assert_eq!(slugify("café & friends"), "caf-friends");
    }
}
