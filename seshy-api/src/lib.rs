//! seshy-api library - REST backend for the Seshy event-planning app
//!
//! Exposes the router builder and shared application state so integration
//! tests can drive the service in-process.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod auth;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post, put};

    Router::new()
        // Health endpoint
        .route("/health", get(api::health::health_check))
        // Profiles, settings, login identifiers
        .route("/profiles", post(api::profiles::create_profile))
        .route("/profiles/:profile_id", get(api::profiles::get_profile))
        .route("/profiles/:profile_id", put(api::profiles::update_profile))
        .route("/profiles/:profile_id", delete(api::profiles::delete_profile))
        .route("/profiles/:profile_id/settings", get(api::profiles::get_settings))
        .route("/profiles/:profile_id/settings", put(api::profiles::put_settings))
        .route("/profiles/:profile_id/login", put(api::profiles::put_login))
        // Places
        .route("/places", get(api::places::list_places))
        .route("/places", post(api::places::create_place))
        .route("/places/:place_id", get(api::places::get_place))
        .route("/places/:place_id", put(api::places::update_place))
        .route("/places/:place_id", delete(api::places::delete_place))
        // Events
        .route("/events", get(api::events::list_events))
        .route("/events", post(api::events::create_event))
        .route("/events/:event_id", get(api::events::get_event))
        .route("/events/:event_id", put(api::events::update_event))
        .route("/events/:event_id", delete(api::events::delete_event))
        .route("/events/:event_id/media", get(api::media::list_event_media))
        .route("/events/:event_id/vibes", get(api::vibes::list_event_vibes))
        // Members (nested under events)
        .route("/events/:event_id/members", get(api::members::list_members))
        .route("/events/:event_id/members", post(api::members::create_member))
        .route("/events/:event_id/members/:member_id", get(api::members::get_member))
        .route("/events/:event_id/members/:member_id", put(api::members::update_member))
        .route("/events/:event_id/members/:member_id", delete(api::members::delete_member))
        // Invites (nested under events, plus token lookup)
        .route("/events/:event_id/invites", get(api::invites::list_invites))
        .route("/events/:event_id/invites", post(api::invites::create_invite))
        .route("/events/:event_id/invites/:invite_id", put(api::invites::update_invite))
        .route("/events/:event_id/invites/:invite_id", delete(api::invites::delete_invite))
        .route("/invites/by-token/:token", get(api::invites::get_invite_by_token))
        // Media records
        .route("/media", post(api::media::create_media))
        .route("/media/:media_id", get(api::media::get_media))
        .route("/media/:media_id", put(api::media::update_media))
        .route("/media/:media_id", delete(api::media::delete_media))
        // Notifications
        .route("/notifications", get(api::notifications::list_notifications))
        .route("/notifications", post(api::notifications::create_notification))
        .route("/notifications/read-all", put(api::notifications::mark_all_read))
        .route("/notifications/:notification_id", get(api::notifications::get_notification))
        .route("/notifications/:notification_id/read", put(api::notifications::mark_notification_read))
        // Tickets (nested under events)
        .route("/events/:event_id/tickets", get(api::tickets::list_tickets))
        .route("/events/:event_id/tickets", post(api::tickets::create_ticket))
        .route("/events/:event_id/tickets/:ticket_id", get(api::tickets::get_ticket))
        .route("/events/:event_id/tickets/:ticket_id", put(api::tickets::update_ticket))
        // Payments
        .route("/payments/:payment_id", get(api::payments::get_payment))
        .route("/payments/tickets/:ticket_id/purchase", post(api::payments::purchase_ticket))
        .route("/payments/:payment_id/status", put(api::payments::update_payment_status))
        // Vibes
        .route("/vibes", get(api::vibes::list_vibes))
        .route("/vibes", post(api::vibes::create_vibe))
        .route("/vibes/:vibe_id", get(api::vibes::get_vibe))
        .route("/vibes/:vibe_id", put(api::vibes::update_vibe))
        .route("/vibes/events/:event_id/vibes/:vibe_id", post(api::vibes::add_vibe_to_event))
        .route("/vibes/events/:event_id/vibes/:vibe_id", delete(api::vibes::remove_vibe_from_event))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
