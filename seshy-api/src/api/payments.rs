//! Payment handlers
//!
//! Purchases create a pending payment; an external settlement process drives
//! the status transitions through the guarded status endpoint. Sold counts on
//! the ticket move only on settlement, inside the same transaction as the
//! status change.

use crate::api::ApiError;
use crate::auth::current_user_id;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use seshy_common::db::models::Payment;
use seshy_common::domain::{NotificationType, PaymentStatus};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PaymentStatusUpdate {
    pub status: PaymentStatus,
}

async fn fetch_payment(
    db: &sqlx::SqlitePool,
    payment_id: Uuid,
) -> Result<Payment, ApiError> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
        .bind(payment_id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))
}

/// GET /payments/:payment_id
///
/// Payments are visible to their owner only; anyone else gets 404 rather
/// than confirmation the payment exists.
pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    let payment = fetch_payment(&state.db, payment_id).await?;
    if payment.user_id != current_user_id().to_string() {
        return Err(ApiError::NotFound("Payment not found".to_string()));
    }
    Ok(Json(payment))
}

/// POST /payments/tickets/:ticket_id/purchase
pub async fn purchase_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let ticket = crate::api::tickets::fetch_ticket(&state.db, ticket_id).await?;

    if ticket
        .expires_at
        .is_some_and(|expires| expires < Utc::now().naive_utc())
    {
        return Err(ApiError::Gone("Ticket sales have closed".to_string()));
    }
    if ticket.sold >= ticket.quantity {
        return Err(ApiError::Conflict("Ticket is sold out".to_string()));
    }

    let payment_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO payments (id, ticket_id, user_id, status, amount_cents)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payment_id.to_string())
    .bind(ticket_id.to_string())
    .bind(current_user_id().to_string())
    .bind(PaymentStatus::Pending)
    .bind(ticket.price_cents)
    .execute(&state.db)
    .await?;

    let payment = fetch_payment(&state.db, payment_id).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

fn transition_allowed(from: PaymentStatus, to: PaymentStatus) -> bool {
    matches!(
        (from, to),
        (PaymentStatus::Pending, PaymentStatus::Succeeded)
            | (PaymentStatus::Pending, PaymentStatus::Failed)
            | (PaymentStatus::Succeeded, PaymentStatus::Refunded)
    )
}

/// PUT /payments/:payment_id/status
pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(body): Json<PaymentStatusUpdate>,
) -> Result<Json<Payment>, ApiError> {
    let payment = fetch_payment(&state.db, payment_id).await?;

    if !transition_allowed(payment.status, body.status) {
        return Err(ApiError::Conflict(format!(
            "Cannot transition payment from {:?} to {:?}",
            payment.status, body.status
        )));
    }

    let mut tx = state.db.begin().await?;

    // The expected-status predicate makes the transition atomic: a concurrent
    // settlement that already moved the payment leaves zero rows here, so the
    // sold count cannot be adjusted twice.
    let transitioned = sqlx::query(
        "UPDATE payments SET status = ?, updated_at = CURRENT_TIMESTAMP \
         WHERE id = ? AND status = ?",
    )
    .bind(body.status)
    .bind(payment_id.to_string())
    .bind(payment.status)
    .execute(&mut *tx)
    .await?;
    if transitioned.rows_affected() == 0 {
        return Err(ApiError::Conflict(
            "Payment was settled by a concurrent request".to_string(),
        ));
    }

    match body.status {
        PaymentStatus::Succeeded => {
            // Guard against overselling between purchase and settlement
            let updated = sqlx::query(
                "UPDATE tickets SET sold = sold + 1, updated_at = CURRENT_TIMESTAMP \
                 WHERE id = ? AND sold < quantity",
            )
            .bind(&payment.ticket_id)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                return Err(ApiError::Conflict("Ticket is sold out".to_string()));
            }
        }
        PaymentStatus::Refunded => {
            sqlx::query(
                "UPDATE tickets SET sold = MAX(sold - 1, 0), updated_at = CURRENT_TIMESTAMP \
                 WHERE id = ?",
            )
            .bind(&payment.ticket_id)
            .execute(&mut *tx)
            .await?;
        }
        PaymentStatus::Pending | PaymentStatus::Failed => {}
    }

    tx.commit().await?;

    if body.status == PaymentStatus::Succeeded {
        if let Ok(buyer) = Uuid::parse_str(&payment.user_id) {
            let event = match Uuid::parse_str(&fetch_ticket_event_id(&state.db, &payment.ticket_id).await?) {
                Ok(event_id) => crate::api::events::fetch_event(&state.db, event_id).await.ok(),
                Err(_) => None,
            };
            crate::api::notifications::push_notification(
                &state.db,
                buyer,
                NotificationType::PaymentSucceeded,
                "Your ticket purchase went through",
                None,
                event.as_ref(),
            )
            .await?;
        }
    }

    Ok(Json(fetch_payment(&state.db, payment_id).await?))
}

async fn fetch_ticket_event_id(
    db: &sqlx::SqlitePool,
    ticket_id: &str,
) -> Result<String, ApiError> {
    let event_id: String = sqlx::query_scalar("SELECT event_id FROM tickets WHERE id = ?")
        .bind(ticket_id)
        .fetch_one(db)
        .await?;
    Ok(event_id)
}
