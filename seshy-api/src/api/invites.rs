//! Invite and join-request handlers
//!
//! Host-initiated invites carry a shareable token with a seven-day expiry.
//! Join requests flow the other way and have no token. Approval creates the
//! guest membership.

use crate::api::events::{fetch_event, require_manager};
use crate::api::ApiError;
use crate::auth::current_user_id;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use seshy_common::db::models::Invite;
use seshy_common::domain::{InviteStatus, InviteType, MemberRole, NotificationType};
use seshy_common::tokens::generate_invite_token;
use serde::Deserialize;
use uuid::Uuid;

const INVITE_EXPIRY_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct InviteCreate {
    /// Invitee for type `invite`; ignored for join requests, which are always
    /// filed by the caller.
    pub user_id: Option<Uuid>,
    #[serde(rename = "type", default = "default_invite_type")]
    pub invite_type: InviteType,
}

fn default_invite_type() -> InviteType {
    InviteType::Invite
}

#[derive(Debug, Deserialize)]
pub struct InviteUpdate {
    pub status: InviteStatus,
}

async fn fetch_invite(
    db: &sqlx::SqlitePool,
    event_id: Uuid,
    invite_id: Uuid,
) -> Result<Invite, ApiError> {
    sqlx::query_as::<_, Invite>(
        "SELECT * FROM invites WHERE id = ? AND event_id = ? AND deleted_at IS NULL",
    )
    .bind(invite_id.to_string())
    .bind(event_id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Invite not found".to_string()))
}

fn is_expired(invite: &Invite) -> bool {
    invite
        .expires_at
        .is_some_and(|expires| expires < Utc::now().naive_utc())
}

/// GET /events/:event_id/invites
pub async fn list_invites(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Invite>>, ApiError> {
    fetch_event(&state.db, event_id).await?;
    require_manager(&state.db, event_id, current_user_id()).await?;

    let invites = sqlx::query_as::<_, Invite>(
        r#"
        SELECT * FROM invites
        WHERE event_id = ? AND deleted_at IS NULL
        ORDER BY created_at DESC
        "#,
    )
    .bind(event_id.to_string())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(invites))
}

/// POST /events/:event_id/invites
pub async fn create_invite(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<InviteCreate>,
) -> Result<(StatusCode, Json<Invite>), ApiError> {
    let event = fetch_event(&state.db, event_id).await?;
    let caller = current_user_id();

    let target_user = match body.invite_type {
        InviteType::Invite => {
            require_manager(&state.db, event_id, caller).await?;
            body.user_id.ok_or_else(|| {
                ApiError::BadRequest("user_id is required for invites".to_string())
            })?
        }
        InviteType::Request => caller,
    };

    crate::api::profiles::fetch_profile(&state.db, target_user).await?;

    if crate::api::members::is_member(&state.db, event_id, target_user).await? {
        return Err(ApiError::Conflict(
            "User is already a member of this event".to_string(),
        ));
    }

    let pending: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM invites
        WHERE event_id = ? AND user_id = ? AND status = 0 AND deleted_at IS NULL
        "#,
    )
    .bind(event_id.to_string())
    .bind(target_user.to_string())
    .fetch_one(&state.db)
    .await?;
    if pending > 0 {
        return Err(ApiError::Conflict(
            "A pending invite already exists for this user".to_string(),
        ));
    }

    let (token, expires_at) = match body.invite_type {
        InviteType::Invite => (
            Some(generate_invite_token()),
            Some((Utc::now() + Duration::days(INVITE_EXPIRY_DAYS)).naive_utc()),
        ),
        InviteType::Request => (None, None),
    };

    let invite_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO invites (id, user_id, type, status, token, expires_at, event_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(invite_id.to_string())
    .bind(target_user.to_string())
    .bind(body.invite_type)
    .bind(InviteStatus::Pending)
    .bind(&token)
    .bind(expires_at)
    .bind(event_id.to_string())
    .execute(&state.db)
    .await?;

    match body.invite_type {
        InviteType::Invite => {
            crate::api::notifications::push_notification(
                &state.db,
                target_user,
                NotificationType::InviteReceived,
                &format!("You're invited to {}", event.name),
                None,
                Some(&event),
            )
            .await?;
        }
        InviteType::Request => {
            // Hosts learn about join requests
            let host_ids: Vec<String> = sqlx::query_scalar(
                "SELECT user_id FROM members WHERE event_id = ? AND role = 0 AND deleted_at IS NULL",
            )
            .bind(event_id.to_string())
            .fetch_all(&state.db)
            .await?;
            for host_id in host_ids {
                if let Ok(host_id) = Uuid::parse_str(&host_id) {
                    crate::api::notifications::push_notification(
                        &state.db,
                        host_id,
                        NotificationType::RequestReceived,
                        &format!("New join request for {}", event.name),
                        None,
                        Some(&event),
                    )
                    .await?;
                }
            }
        }
    }

    let invite = fetch_invite(&state.db, event_id, invite_id).await?;
    Ok((StatusCode::CREATED, Json(invite)))
}

/// PUT /events/:event_id/invites/:invite_id
///
/// Status transitions. Only pending invites can move; approval creates the
/// guest membership, subject to the capacity check.
pub async fn update_invite(
    State(state): State<AppState>,
    Path((event_id, invite_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<InviteUpdate>,
) -> Result<Json<Invite>, ApiError> {
    let event = fetch_event(&state.db, event_id).await?;
    let invite = fetch_invite(&state.db, event_id, invite_id).await?;

    if invite.status != InviteStatus::Pending {
        return Err(ApiError::Conflict(
            "Only pending invites can change status".to_string(),
        ));
    }
    if is_expired(&invite) {
        return Err(ApiError::Gone("Invite has expired".to_string()));
    }

    let caller = current_user_id();
    match body.status {
        InviteStatus::Pending => {
            return Err(ApiError::BadRequest(
                "Cannot transition an invite back to pending".to_string(),
            ));
        }
        // Approving an invite is the invitee's call; approving a join
        // request is the host's.
        InviteStatus::Approved | InviteStatus::Declined => match invite.invite_type {
            InviteType::Invite => {
                if invite.user_id != caller.to_string() {
                    return Err(ApiError::Forbidden(
                        "Only the invitee may respond to an invite".to_string(),
                    ));
                }
            }
            InviteType::Request => {
                require_manager(&state.db, event_id, caller).await?;
            }
        },
        InviteStatus::Revoked => {
            require_manager(&state.db, event_id, caller).await?;
        }
        InviteStatus::Expired => {
            return Err(ApiError::BadRequest(
                "Expiry is applied automatically, not via update".to_string(),
            ));
        }
    }

    if body.status == InviteStatus::Approved {
        let invitee = Uuid::parse_str(&invite.user_id)
            .map_err(|_| ApiError::NotFound("Invitee profile not found".to_string()))?;
        if !crate::api::members::is_member(&state.db, event_id, invitee).await? {
            crate::api::members::check_capacity(&state.db, event_id).await?;
            crate::api::members::insert_member(&state.db, event_id, invitee, MemberRole::Guest)
                .await?;
        }
        if invite.invite_type == InviteType::Request {
            crate::api::notifications::push_notification(
                &state.db,
                invitee,
                NotificationType::InviteApproved,
                &format!("Your request to join {} was approved", event.name),
                None,
                Some(&event),
            )
            .await?;
        }
    }

    sqlx::query("UPDATE invites SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(body.status)
        .bind(invite_id.to_string())
        .execute(&state.db)
        .await?;

    Ok(Json(fetch_invite(&state.db, event_id, invite_id).await?))
}

/// DELETE /events/:event_id/invites/:invite_id
pub async fn delete_invite(
    State(state): State<AppState>,
    Path((event_id, invite_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let invite = fetch_invite(&state.db, event_id, invite_id).await?;

    let caller = current_user_id();
    if invite.user_id != caller.to_string() {
        require_manager(&state.db, event_id, caller).await?;
    }

    sqlx::query("UPDATE invites SET deleted_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(invite_id.to_string())
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /invites/by-token/:token
///
/// Public lookup used by shared invite links. Expired tokens return 410 so
/// clients can show a distinct "link expired" state.
pub async fn get_invite_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Invite>, ApiError> {
    let invite = sqlx::query_as::<_, Invite>(
        "SELECT * FROM invites WHERE token = ? AND deleted_at IS NULL",
    )
    .bind(&token)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Invite not found".to_string()))?;

    if is_expired(&invite) || invite.status == InviteStatus::Expired {
        return Err(ApiError::Gone("Invite has expired".to_string()));
    }

    Ok(Json(invite))
}
