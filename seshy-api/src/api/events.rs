//! Event handlers
//!
//! Creating an event also creates the host membership for the caller. Events
//! are soft-deleted; deletion marks the event cancelled so clients holding a
//! stale copy render it correctly.

use crate::api::ApiError;
use crate::auth::current_user_id;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDateTime, Utc};
use seshy_common::db::models::EventItem;
use seshy_common::domain::{EventStatus, EventVisibility, MemberRole};
use serde::Deserialize;
use uuid::Uuid;

const DEFAULT_BRAND_COLOR: &str = "#5B8DEF";

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    /// Time-based filter: "upcoming", "live", or "past"
    pub status: Option<String>,
    /// Only events this user is a member of
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct EventCreate {
    pub name: String,
    pub details: Option<String>,
    pub brand_color: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub is_all_day: bool,
    pub location_id: Option<Uuid>,
    pub max_capacity: Option<i64>,
    pub visibility: Option<EventVisibility>,
}

#[derive(Debug, Deserialize)]
pub struct EventUpdate {
    pub status: Option<EventStatus>,
    pub name: Option<String>,
    pub details: Option<String>,
    pub brand_color: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
    pub is_all_day: Option<bool>,
    pub location_id: Option<Uuid>,
    pub max_capacity: Option<i64>,
    pub visibility: Option<EventVisibility>,
}

pub(crate) async fn fetch_event(
    db: &sqlx::SqlitePool,
    event_id: Uuid,
) -> Result<EventItem, ApiError> {
    sqlx::query_as::<_, EventItem>(
        "SELECT * FROM event_items WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(event_id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))
}

/// Require the caller to hold a host or staff membership on the event.
pub(crate) async fn require_manager(
    db: &sqlx::SqlitePool,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<(), ApiError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM members
        WHERE event_id = ? AND user_id = ? AND role IN (0, 1) AND deleted_at IS NULL
        "#,
    )
    .bind(event_id.to_string())
    .bind(user_id.to_string())
    .fetch_one(db)
    .await?;

    if count == 0 {
        return Err(ApiError::Forbidden(
            "Only hosts or staff may modify this event".to_string(),
        ));
    }
    Ok(())
}

fn validate_times(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<(), ApiError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(ApiError::BadRequest(
                "start_time must be before end_time".to_string(),
            ));
        }
    }
    Ok(())
}

/// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<EventItem>>, ApiError> {
    let mut sql = String::from("SELECT e.* FROM event_items e");
    if query.user_id.is_some() {
        sql.push_str(
            " JOIN members m ON m.event_id = e.id AND m.user_id = ? AND m.deleted_at IS NULL",
        );
    }
    sql.push_str(" WHERE e.deleted_at IS NULL");

    match query.status.as_deref() {
        Some("upcoming") => {
            sql.push_str(" AND e.start_time > datetime('now') AND e.status NOT IN (2, 3)");
        }
        Some("live") => {
            // A null end_time counts as still live
            sql.push_str(
                " AND e.start_time <= datetime('now') AND e.status NOT IN (2, 3) \
                 AND (e.end_time IS NULL OR e.end_time >= datetime('now'))",
            );
        }
        Some("past") => {
            sql.push_str(" AND (e.end_time < datetime('now') OR e.status IN (2, 3))");
        }
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "Unknown status filter '{}' (expected upcoming, live, or past)",
                other
            )));
        }
        None => {}
    }
    sql.push_str(" ORDER BY e.start_time LIMIT ? OFFSET ?");

    let mut q = sqlx::query_as::<_, EventItem>(&sql);
    if let Some(user_id) = query.user_id {
        q = q.bind(user_id.to_string());
    }
    let events = q
        .bind(query.limit)
        .bind(query.skip)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(events))
}

/// POST /events
///
/// The caller becomes the event's host, with their profile snapshotted into
/// the membership row.
pub async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<EventCreate>,
) -> Result<(StatusCode, Json<EventItem>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    validate_times(body.start_time, body.end_time)?;
    let max_capacity = body.max_capacity.unwrap_or(0);
    if max_capacity < 0 {
        return Err(ApiError::BadRequest("max_capacity must be non-negative".to_string()));
    }
    if let Some(location_id) = body.location_id {
        crate::api::places::fetch_place(&state.db, location_id).await?;
    }

    let user_id = current_user_id();
    let creator = crate::api::profiles::fetch_profile(&state.db, user_id).await?;

    let event_id = Uuid::new_v4();
    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO event_items (id, status, name, details, brand_color, start_time, end_time,
                                 duration_minutes, is_all_day, location_id, max_capacity, visibility)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(event_id.to_string())
    .bind(EventStatus::Upcoming)
    .bind(&body.name)
    .bind(&body.details)
    .bind(body.brand_color.as_deref().unwrap_or(DEFAULT_BRAND_COLOR))
    .bind(body.start_time)
    .bind(body.end_time)
    .bind(body.duration_minutes)
    .bind(body.is_all_day)
    .bind(body.location_id.map(|id| id.to_string()))
    .bind(max_capacity)
    .bind(body.visibility.unwrap_or(EventVisibility::OnlyUser))
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO members (id, role, user_id, display_name, username, avatar_url, event_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(MemberRole::Host)
    .bind(user_id.to_string())
    .bind(&creator.display_name)
    .bind(&creator.username)
    .bind(&creator.avatar_url)
    .bind(event_id.to_string())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let event = fetch_event(&state.db, event_id).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventItem>, ApiError> {
    Ok(Json(fetch_event(&state.db, event_id).await?))
}

/// PUT /events/:event_id
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<EventUpdate>,
) -> Result<Json<EventItem>, ApiError> {
    let existing = fetch_event(&state.db, event_id).await?;
    require_manager(&state.db, event_id, current_user_id()).await?;

    let start = body.start_time.or(existing.start_time);
    let end = body.end_time.or(existing.end_time);
    validate_times(start, end)?;
    if let Some(capacity) = body.max_capacity {
        if capacity < 0 {
            return Err(ApiError::BadRequest("max_capacity must be non-negative".to_string()));
        }
        // Zero stays "unlimited"; any positive cap must cover current members
        if capacity > 0 {
            let member_count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM members WHERE event_id = ? AND deleted_at IS NULL",
            )
            .bind(event_id.to_string())
            .fetch_one(&state.db)
            .await?;
            if member_count > capacity {
                return Err(ApiError::BadRequest(format!(
                    "Cannot set max_capacity below current member count ({})",
                    member_count
                )));
            }
        }
    }
    if let Some(location_id) = body.location_id {
        crate::api::places::fetch_place(&state.db, location_id).await?;
    }

    // Schedule status follows the effective times; an explicit status in the
    // request still wins.
    let now = Utc::now().naive_utc();
    let recomputed = match (start, end) {
        (Some(start), _) if start > now => Some(EventStatus::Upcoming),
        (Some(_), Some(end)) if end < now => Some(EventStatus::Ended),
        (Some(_), _) => Some(EventStatus::Live),
        (None, _) => None,
    };
    let status = body.status.or(recomputed);

    sqlx::query(
        r#"
        UPDATE event_items
        SET status = COALESCE(?, status),
            name = COALESCE(?, name),
            details = COALESCE(?, details),
            brand_color = COALESCE(?, brand_color),
            start_time = COALESCE(?, start_time),
            end_time = COALESCE(?, end_time),
            duration_minutes = COALESCE(?, duration_minutes),
            is_all_day = COALESCE(?, is_all_day),
            location_id = COALESCE(?, location_id),
            max_capacity = COALESCE(?, max_capacity),
            visibility = COALESCE(?, visibility),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(status)
    .bind(&body.name)
    .bind(&body.details)
    .bind(&body.brand_color)
    .bind(body.start_time)
    .bind(body.end_time)
    .bind(body.duration_minutes)
    .bind(body.is_all_day)
    .bind(body.location_id.map(|id| id.to_string()))
    .bind(body.max_capacity)
    .bind(body.visibility)
    .bind(event_id.to_string())
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_event(&state.db, event_id).await?))
}

/// DELETE /events/:event_id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    fetch_event(&state.db, event_id).await?;
    require_manager(&state.db, event_id, current_user_id()).await?;

    sqlx::query(
        "UPDATE event_items SET status = ?, deleted_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(EventStatus::Cancelled)
    .bind(event_id.to_string())
    .execute(&state.db)
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
