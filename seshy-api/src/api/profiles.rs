//! Profile, settings, and login identifier handlers

use crate::api::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use seshy_common::db::models::{PublicProfile, UserSettings};
use seshy_common::domain::{AppearanceMode, MapStyle};
use seshy_common::tokens::hash_identifier;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ProfileCreate {
    pub display_name: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub age_years: Option<i64>,
    pub gender: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub age_years: Option<i64>,
    pub gender: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
    pub appearance_mode: Option<AppearanceMode>,
    pub map_style: Option<MapStyle>,
    pub map_center_latitude: Option<f64>,
    pub map_center_longitude: Option<f64>,
    pub map_zoom_level: Option<f64>,
    pub map_max_distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LoginUpdate {
    /// Phone number in E.164 form; stored hashed only
    pub phone: String,
    pub email: Option<String>,
}

pub(crate) async fn fetch_profile(
    db: &sqlx::SqlitePool,
    profile_id: Uuid,
) -> Result<PublicProfile, ApiError> {
    sqlx::query_as::<_, PublicProfile>(
        "SELECT * FROM public_profiles WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(profile_id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))
}

async fn username_taken(
    db: &sqlx::SqlitePool,
    username: &str,
    exclude_id: Option<Uuid>,
) -> Result<bool, ApiError> {
    let exclude = exclude_id.map(|id| id.to_string()).unwrap_or_default();
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM public_profiles WHERE username = ? AND id != ? AND deleted_at IS NULL",
    )
    .bind(username)
    .bind(exclude)
    .fetch_one(db)
    .await?;
    Ok(count > 0)
}

/// POST /profiles
pub async fn create_profile(
    State(state): State<AppState>,
    Json(body): Json<ProfileCreate>,
) -> Result<(StatusCode, Json<PublicProfile>), ApiError> {
    if body.display_name.trim().is_empty() {
        return Err(ApiError::BadRequest("display_name must not be empty".to_string()));
    }
    if let Some(username) = &body.username {
        if username_taken(&state.db, username, None).await? {
            return Err(ApiError::Conflict(format!("Username '{}' is taken", username)));
        }
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO public_profiles (id, display_name, username, avatar_url, bio, age_years, gender)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&body.display_name)
    .bind(&body.username)
    .bind(&body.avatar_url)
    .bind(&body.bio)
    .bind(body.age_years)
    .bind(&body.gender)
    .execute(&state.db)
    .await?;

    let profile = fetch_profile(&state.db, id).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /profiles/:profile_id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<PublicProfile>, ApiError> {
    Ok(Json(fetch_profile(&state.db, profile_id).await?))
}

/// PUT /profiles/:profile_id
///
/// Partial update: absent fields keep their stored values.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<PublicProfile>, ApiError> {
    fetch_profile(&state.db, profile_id).await?;

    if let Some(username) = &body.username {
        if username_taken(&state.db, username, Some(profile_id)).await? {
            return Err(ApiError::Conflict(format!("Username '{}' is taken", username)));
        }
    }

    sqlx::query(
        r#"
        UPDATE public_profiles
        SET display_name = COALESCE(?, display_name),
            username = COALESCE(?, username),
            avatar_url = COALESCE(?, avatar_url),
            bio = COALESCE(?, bio),
            age_years = COALESCE(?, age_years),
            gender = COALESCE(?, gender),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&body.display_name)
    .bind(&body.username)
    .bind(&body.avatar_url)
    .bind(&body.bio)
    .bind(body.age_years)
    .bind(&body.gender)
    .bind(profile_id.to_string())
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_profile(&state.db, profile_id).await?))
}

/// DELETE /profiles/:profile_id
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    fetch_profile(&state.db, profile_id).await?;

    sqlx::query("UPDATE public_profiles SET deleted_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(profile_id.to_string())
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /profiles/:profile_id/settings
pub async fn get_settings(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<UserSettings>, ApiError> {
    fetch_profile(&state.db, profile_id).await?;

    sqlx::query_as::<_, UserSettings>("SELECT * FROM user_settings WHERE user_id = ?")
        .bind(profile_id.to_string())
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Settings not found".to_string()))
}

/// PUT /profiles/:profile_id/settings
///
/// Creates the settings row on first write, then applies partial updates.
pub async fn put_settings(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(body): Json<SettingsUpdate>,
) -> Result<Json<UserSettings>, ApiError> {
    fetch_profile(&state.db, profile_id).await?;

    sqlx::query("INSERT OR IGNORE INTO user_settings (id, user_id) VALUES (?, ?)")
        .bind(Uuid::new_v4().to_string())
        .bind(profile_id.to_string())
        .execute(&state.db)
        .await?;

    sqlx::query(
        r#"
        UPDATE user_settings
        SET appearance_mode = COALESCE(?, appearance_mode),
            map_style = COALESCE(?, map_style),
            map_center_latitude = COALESCE(?, map_center_latitude),
            map_center_longitude = COALESCE(?, map_center_longitude),
            map_zoom_level = COALESCE(?, map_zoom_level),
            map_max_distance = COALESCE(?, map_max_distance),
            updated_at = CURRENT_TIMESTAMP
        WHERE user_id = ?
        "#,
    )
    .bind(body.appearance_mode)
    .bind(body.map_style)
    .bind(body.map_center_latitude)
    .bind(body.map_center_longitude)
    .bind(body.map_zoom_level)
    .bind(body.map_max_distance)
    .bind(profile_id.to_string())
    .execute(&state.db)
    .await?;

    get_settings(State(state), Path(profile_id)).await
}

/// PUT /profiles/:profile_id/login
///
/// Stores hashed login identifiers. Raw phone/email never hit storage.
pub async fn put_login(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(body): Json<LoginUpdate>,
) -> Result<StatusCode, ApiError> {
    fetch_profile(&state.db, profile_id).await?;

    if body.phone.trim().is_empty() {
        return Err(ApiError::BadRequest("phone must not be empty".to_string()));
    }

    let phone_hash = hash_identifier(&body.phone);
    let email_hash = body.email.as_deref().map(hash_identifier);

    sqlx::query(
        r#"
        INSERT INTO user_logins (id, user_id, phone_hash, email_hash)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE
        SET phone_hash = excluded.phone_hash,
            email_hash = excluded.email_hash,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(profile_id.to_string())
    .bind(&phone_hash)
    .bind(&email_hash)
    .execute(&state.db)
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
