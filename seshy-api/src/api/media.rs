//! Media record handlers
//!
//! Media rows are metadata only; the bytes live in object storage and are
//! referenced by URL. Each row belongs to exactly one owner: an event, a
//! user profile, or a public profile.

use crate::api::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use seshy_common::db::models::Media;
use serde::Deserialize;
use uuid::Uuid;

const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Debug, Deserialize)]
pub struct MediaCreate {
    pub url: String,
    #[serde(default)]
    pub position: i64,
    pub mime_type: Option<String>,
    pub average_color_hex: Option<String>,
    pub event_id: Option<Uuid>,
    pub user_profile_id: Option<Uuid>,
    pub public_profile_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct MediaUpdate {
    pub url: Option<String>,
    pub position: Option<i64>,
    pub mime_type: Option<String>,
    pub average_color_hex: Option<String>,
}

fn validate_mime_type(mime_type: Option<&str>) -> Result<(), ApiError> {
    if let Some(mime) = mime_type {
        if !ALLOWED_MIME_TYPES.contains(&mime) {
            return Err(ApiError::BadRequest(format!(
                "Unsupported mime_type '{}' (expected one of {})",
                mime,
                ALLOWED_MIME_TYPES.join(", ")
            )));
        }
    }
    Ok(())
}

async fn fetch_media(db: &sqlx::SqlitePool, media_id: Uuid) -> Result<Media, ApiError> {
    sqlx::query_as::<_, Media>("SELECT * FROM media WHERE id = ? AND deleted_at IS NULL")
        .bind(media_id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Media not found".to_string()))
}

/// GET /events/:event_id/media
pub async fn list_event_media(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Media>>, ApiError> {
    crate::api::events::fetch_event(&state.db, event_id).await?;

    let media = sqlx::query_as::<_, Media>(
        r#"
        SELECT * FROM media
        WHERE event_id = ? AND deleted_at IS NULL
        ORDER BY position, created_at
        "#,
    )
    .bind(event_id.to_string())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(media))
}

/// POST /media
pub async fn create_media(
    State(state): State<AppState>,
    Json(body): Json<MediaCreate>,
) -> Result<(StatusCode, Json<Media>), ApiError> {
    if body.url.trim().is_empty() {
        return Err(ApiError::BadRequest("url must not be empty".to_string()));
    }
    if body.position < 0 {
        return Err(ApiError::BadRequest("position must be non-negative".to_string()));
    }
    validate_mime_type(body.mime_type.as_deref())?;

    let owners = [
        body.event_id.is_some(),
        body.user_profile_id.is_some(),
        body.public_profile_id.is_some(),
    ];
    if owners.iter().filter(|&&set| set).count() != 1 {
        return Err(ApiError::BadRequest(
            "Exactly one of event_id, user_profile_id, public_profile_id is required".to_string(),
        ));
    }

    if let Some(event_id) = body.event_id {
        crate::api::events::fetch_event(&state.db, event_id).await?;
    }
    if let Some(profile_id) = body.user_profile_id.or(body.public_profile_id) {
        crate::api::profiles::fetch_profile(&state.db, profile_id).await?;
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO media (id, url, position, mime_type, average_color_hex,
                           event_id, user_profile_id, public_profile_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&body.url)
    .bind(body.position)
    .bind(&body.mime_type)
    .bind(&body.average_color_hex)
    .bind(body.event_id.map(|id| id.to_string()))
    .bind(body.user_profile_id.map(|id| id.to_string()))
    .bind(body.public_profile_id.map(|id| id.to_string()))
    .execute(&state.db)
    .await?;

    let media = fetch_media(&state.db, id).await?;
    Ok((StatusCode::CREATED, Json(media)))
}

/// GET /media/:media_id
pub async fn get_media(
    State(state): State<AppState>,
    Path(media_id): Path<Uuid>,
) -> Result<Json<Media>, ApiError> {
    Ok(Json(fetch_media(&state.db, media_id).await?))
}

/// PUT /media/:media_id
///
/// Ownership is fixed at creation; only display fields can change.
pub async fn update_media(
    State(state): State<AppState>,
    Path(media_id): Path<Uuid>,
    Json(body): Json<MediaUpdate>,
) -> Result<Json<Media>, ApiError> {
    fetch_media(&state.db, media_id).await?;

    if body.position.is_some_and(|p| p < 0) {
        return Err(ApiError::BadRequest("position must be non-negative".to_string()));
    }
    if body.url.as_deref().is_some_and(|u| u.trim().is_empty()) {
        return Err(ApiError::BadRequest("url must not be empty".to_string()));
    }
    validate_mime_type(body.mime_type.as_deref())?;

    sqlx::query(
        r#"
        UPDATE media
        SET url = COALESCE(?, url),
            position = COALESCE(?, position),
            mime_type = COALESCE(?, mime_type),
            average_color_hex = COALESCE(?, average_color_hex),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&body.url)
    .bind(body.position)
    .bind(&body.mime_type)
    .bind(&body.average_color_hex)
    .bind(media_id.to_string())
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_media(&state.db, media_id).await?))
}

/// DELETE /media/:media_id
pub async fn delete_media(
    State(state): State<AppState>,
    Path(media_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    fetch_media(&state.db, media_id).await?;

    sqlx::query("UPDATE media SET deleted_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(media_id.to_string())
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
