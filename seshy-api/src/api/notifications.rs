//! Notification handlers
//!
//! Notifications belong to the requesting user; there is no cross-user read
//! path. Other handlers push rows here when something happens to the user.

use crate::api::ApiError;
use crate::auth::current_user_id;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use seshy_common::db::models::{EventItem, UserNotification};
use seshy_common::domain::NotificationType;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct NotificationCreate {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub subtitle: Option<String>,
    pub event_id: Option<Uuid>,
    pub metadata: Option<String>,
    pub primary_action: Option<String>,
    pub secondary_action: Option<String>,
}

async fn fetch_notification(
    db: &sqlx::SqlitePool,
    notification_id: Uuid,
    user_id: Uuid,
) -> Result<UserNotification, ApiError> {
    sqlx::query_as::<_, UserNotification>(
        "SELECT * FROM user_notifications WHERE id = ? AND user_id = ?",
    )
    .bind(notification_id.to_string())
    .bind(user_id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))
}

/// Insert a notification for `user_id`, denormalizing the event's display
/// fields when the notification is tied to an event.
pub(crate) async fn push_notification(
    db: &sqlx::SqlitePool,
    user_id: Uuid,
    notification_type: NotificationType,
    title: &str,
    subtitle: Option<&str>,
    event: Option<&EventItem>,
) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO user_notifications (id, user_id, type, title, subtitle,
                                        event_id, event_name, event_color)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id.to_string())
    .bind(notification_type)
    .bind(title)
    .bind(subtitle)
    .bind(event.map(|e| e.id.clone()))
    .bind(event.map(|e| e.name.clone()))
    .bind(event.map(|e| e.brand_color.clone()))
    .execute(db)
    .await?;

    Ok(())
}

/// GET /notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Vec<UserNotification>>, ApiError> {
    let sql = if query.unread_only {
        "SELECT * FROM user_notifications WHERE user_id = ? AND is_unread = 1 \
         ORDER BY timestamp DESC LIMIT ? OFFSET ?"
    } else {
        "SELECT * FROM user_notifications WHERE user_id = ? \
         ORDER BY timestamp DESC LIMIT ? OFFSET ?"
    };

    let notifications = sqlx::query_as::<_, UserNotification>(sql)
        .bind(current_user_id().to_string())
        .bind(query.limit)
        .bind(query.skip)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(notifications))
}

/// POST /notifications
pub async fn create_notification(
    State(state): State<AppState>,
    Json(body): Json<NotificationCreate>,
) -> Result<(StatusCode, Json<UserNotification>), ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    crate::api::profiles::fetch_profile(&state.db, body.user_id).await?;

    let event = match body.event_id {
        Some(event_id) => Some(crate::api::events::fetch_event(&state.db, event_id).await?),
        None => None,
    };

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO user_notifications (id, user_id, type, title, subtitle, metadata,
                                        primary_action, secondary_action,
                                        event_id, event_name, event_color)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(body.user_id.to_string())
    .bind(body.notification_type)
    .bind(&body.title)
    .bind(&body.subtitle)
    .bind(&body.metadata)
    .bind(&body.primary_action)
    .bind(&body.secondary_action)
    .bind(event.as_ref().map(|e| e.id.clone()))
    .bind(event.as_ref().map(|e| e.name.clone()))
    .bind(event.as_ref().map(|e| e.brand_color.clone()))
    .execute(&state.db)
    .await?;

    let notification = fetch_notification(&state.db, id, body.user_id).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// PUT /notifications/read-all
pub async fn mark_all_read(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    sqlx::query(
        r#"
        UPDATE user_notifications
        SET is_unread = 0, updated_at = CURRENT_TIMESTAMP
        WHERE user_id = ? AND is_unread = 1
        "#,
    )
    .bind(current_user_id().to_string())
    .execute(&state.db)
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /notifications/:notification_id
pub async fn get_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<UserNotification>, ApiError> {
    let notification =
        fetch_notification(&state.db, notification_id, current_user_id()).await?;
    Ok(Json(notification))
}

/// PUT /notifications/:notification_id/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<UserNotification>, ApiError> {
    let user_id = current_user_id();
    fetch_notification(&state.db, notification_id, user_id).await?;

    sqlx::query(
        "UPDATE user_notifications SET is_unread = 0, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(notification_id.to_string())
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_notification(&state.db, notification_id, user_id).await?))
}
