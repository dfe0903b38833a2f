//! Event membership handlers
//!
//! Membership rows snapshot the profile's display fields at join time so the
//! guest list stays stable even if a profile is later edited or deleted.

use crate::api::events::{fetch_event, require_manager};
use crate::api::ApiError;
use crate::auth::current_user_id;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use seshy_common::db::models::Member;
use seshy_common::domain::MemberRole;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct MemberCreate {
    pub user_id: Uuid,
    pub role: Option<MemberRole>,
}

#[derive(Debug, Deserialize)]
pub struct MemberUpdate {
    pub role: MemberRole,
}

async fn fetch_member(
    db: &sqlx::SqlitePool,
    event_id: Uuid,
    member_id: Uuid,
) -> Result<Member, ApiError> {
    sqlx::query_as::<_, Member>(
        "SELECT * FROM members WHERE id = ? AND event_id = ? AND deleted_at IS NULL",
    )
    .bind(member_id.to_string())
    .bind(event_id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))
}

async fn count_hosts(db: &sqlx::SqlitePool, event_id: Uuid) -> Result<i64, ApiError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM members WHERE event_id = ? AND role = 0 AND deleted_at IS NULL",
    )
    .bind(event_id.to_string())
    .fetch_one(db)
    .await?;
    Ok(count)
}

/// Insert a membership row with the profile's display fields snapshotted.
///
/// Shared with the invite approval path, which adds members outside the
/// member-creation endpoint.
pub(crate) async fn insert_member(
    db: &sqlx::SqlitePool,
    event_id: Uuid,
    user_id: Uuid,
    role: MemberRole,
) -> Result<Member, ApiError> {
    let profile = crate::api::profiles::fetch_profile(db, user_id).await?;

    let member_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO members (id, role, user_id, display_name, username, avatar_url, event_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(member_id.to_string())
    .bind(role)
    .bind(user_id.to_string())
    .bind(&profile.display_name)
    .bind(&profile.username)
    .bind(&profile.avatar_url)
    .bind(event_id.to_string())
    .execute(db)
    .await?;

    fetch_member(db, event_id, member_id).await
}

/// Reject the add when the event is already at capacity. Zero capacity means
/// unlimited.
pub(crate) async fn check_capacity(
    db: &sqlx::SqlitePool,
    event_id: Uuid,
) -> Result<(), ApiError> {
    let event = fetch_event(db, event_id).await?;
    if event.max_capacity == 0 {
        return Ok(());
    }

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM members WHERE event_id = ? AND deleted_at IS NULL",
    )
    .bind(event_id.to_string())
    .fetch_one(db)
    .await?;

    if count >= event.max_capacity {
        return Err(ApiError::Conflict("Event is at capacity".to_string()));
    }
    Ok(())
}

pub(crate) async fn is_member(
    db: &sqlx::SqlitePool,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<bool, ApiError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM members WHERE event_id = ? AND user_id = ? AND deleted_at IS NULL",
    )
    .bind(event_id.to_string())
    .bind(user_id.to_string())
    .fetch_one(db)
    .await?;
    Ok(count > 0)
}

/// GET /events/:event_id/members
pub async fn list_members(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Member>>, ApiError> {
    fetch_event(&state.db, event_id).await?;

    let members = sqlx::query_as::<_, Member>(
        r#"
        SELECT * FROM members
        WHERE event_id = ? AND deleted_at IS NULL
        ORDER BY role, created_at
        "#,
    )
    .bind(event_id.to_string())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(members))
}

/// POST /events/:event_id/members
pub async fn create_member(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<MemberCreate>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    fetch_event(&state.db, event_id).await?;
    require_manager(&state.db, event_id, current_user_id()).await?;

    if is_member(&state.db, event_id, body.user_id).await? {
        return Err(ApiError::Conflict(
            "User is already a member of this event".to_string(),
        ));
    }
    check_capacity(&state.db, event_id).await?;

    let role = body.role.unwrap_or(MemberRole::Guest);
    let member = insert_member(&state.db, event_id, body.user_id, role).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /events/:event_id/members/:member_id
pub async fn get_member(
    State(state): State<AppState>,
    Path((event_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Member>, ApiError> {
    Ok(Json(fetch_member(&state.db, event_id, member_id).await?))
}

/// PUT /events/:event_id/members/:member_id
///
/// Role changes only. Demoting the last remaining host is rejected.
pub async fn update_member(
    State(state): State<AppState>,
    Path((event_id, member_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<MemberUpdate>,
) -> Result<Json<Member>, ApiError> {
    let member = fetch_member(&state.db, event_id, member_id).await?;
    require_manager(&state.db, event_id, current_user_id()).await?;

    if member.role == MemberRole::Host
        && body.role != MemberRole::Host
        && count_hosts(&state.db, event_id).await? <= 1
    {
        return Err(ApiError::Conflict(
            "Event must retain at least one host".to_string(),
        ));
    }

    sqlx::query("UPDATE members SET role = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(body.role)
        .bind(member_id.to_string())
        .execute(&state.db)
        .await?;

    Ok(Json(fetch_member(&state.db, event_id, member_id).await?))
}

/// DELETE /events/:event_id/members/:member_id
///
/// Members may remove themselves; removing anyone else requires host or staff
/// role. The last host cannot leave.
pub async fn delete_member(
    State(state): State<AppState>,
    Path((event_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let member = fetch_member(&state.db, event_id, member_id).await?;

    let caller = current_user_id();
    if member.user_id != caller.to_string() {
        require_manager(&state.db, event_id, caller).await?;
    }

    if member.role == MemberRole::Host && count_hosts(&state.db, event_id).await? <= 1 {
        return Err(ApiError::Conflict(
            "Event must retain at least one host".to_string(),
        ));
    }

    sqlx::query("UPDATE members SET deleted_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(member_id.to_string())
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
