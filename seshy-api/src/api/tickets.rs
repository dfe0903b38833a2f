//! Ticket tier handlers

use crate::api::events::fetch_event;
use crate::api::ApiError;
use crate::auth::current_user_id;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDateTime;
use seshy_common::db::models::Ticket;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct TicketCreate {
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub expires_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct TicketUpdate {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub expires_at: Option<NaiveDateTime>,
}

/// Ticket sales money flows require the host role, not just staff.
async fn require_host(
    db: &sqlx::SqlitePool,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<(), ApiError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM members
        WHERE event_id = ? AND user_id = ? AND role = 0 AND deleted_at IS NULL
        "#,
    )
    .bind(event_id.to_string())
    .bind(user_id.to_string())
    .fetch_one(db)
    .await?;

    if count == 0 {
        return Err(ApiError::Forbidden(
            "Only hosts may manage tickets".to_string(),
        ));
    }
    Ok(())
}

pub(crate) async fn fetch_ticket(
    db: &sqlx::SqlitePool,
    ticket_id: Uuid,
) -> Result<Ticket, ApiError> {
    sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ?")
        .bind(ticket_id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))
}

async fn fetch_event_ticket(
    db: &sqlx::SqlitePool,
    event_id: Uuid,
    ticket_id: Uuid,
) -> Result<Ticket, ApiError> {
    let ticket = fetch_ticket(db, ticket_id).await?;
    if ticket.event_id != event_id.to_string() {
        return Err(ApiError::NotFound("Ticket not found".to_string()));
    }
    Ok(ticket)
}

/// GET /events/:event_id/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    fetch_event(&state.db, event_id).await?;

    let tickets = sqlx::query_as::<_, Ticket>(
        "SELECT * FROM tickets WHERE event_id = ? ORDER BY price_cents, created_at",
    )
    .bind(event_id.to_string())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(tickets))
}

/// POST /events/:event_id/tickets
pub async fn create_ticket(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<TicketCreate>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    fetch_event(&state.db, event_id).await?;
    require_host(&state.db, event_id, current_user_id()).await?;

    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    if body.price_cents < 0 {
        return Err(ApiError::BadRequest("price_cents must be non-negative".to_string()));
    }
    if body.quantity < 1 {
        return Err(ApiError::BadRequest("quantity must be at least 1".to_string()));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO tickets (id, event_id, name, price_cents, quantity, expires_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(event_id.to_string())
    .bind(&body.name)
    .bind(body.price_cents)
    .bind(body.quantity)
    .bind(body.expires_at)
    .execute(&state.db)
    .await?;

    let ticket = fetch_ticket(&state.db, id).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// GET /events/:event_id/tickets/:ticket_id
pub async fn get_ticket(
    State(state): State<AppState>,
    Path((event_id, ticket_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Ticket>, ApiError> {
    Ok(Json(fetch_event_ticket(&state.db, event_id, ticket_id).await?))
}

/// PUT /events/:event_id/tickets/:ticket_id
///
/// Quantity can never drop below the number already sold.
pub async fn update_ticket(
    State(state): State<AppState>,
    Path((event_id, ticket_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<TicketUpdate>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = fetch_event_ticket(&state.db, event_id, ticket_id).await?;
    require_host(&state.db, event_id, current_user_id()).await?;

    if body.price_cents.is_some_and(|p| p < 0) {
        return Err(ApiError::BadRequest("price_cents must be non-negative".to_string()));
    }
    if let Some(quantity) = body.quantity {
        if quantity < 1 {
            return Err(ApiError::BadRequest("quantity must be at least 1".to_string()));
        }
        if quantity < ticket.sold {
            return Err(ApiError::Conflict(format!(
                "quantity cannot drop below the {} already sold",
                ticket.sold
            )));
        }
    }

    sqlx::query(
        r#"
        UPDATE tickets
        SET name = COALESCE(?, name),
            price_cents = COALESCE(?, price_cents),
            quantity = COALESCE(?, quantity),
            expires_at = COALESCE(?, expires_at),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&body.name)
    .bind(body.price_cents)
    .bind(body.quantity)
    .bind(body.expires_at)
    .bind(ticket_id.to_string())
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_ticket(&state.db, ticket_id).await?))
}
