//! Database row models
//!
//! One struct per table, decoded with `sqlx::FromRow` and serialized directly
//! as API responses. IDs are UUIDs stored as TEXT.

use crate::domain::{
    AppearanceMode, EventStatus, EventVisibility, InviteStatus, InviteType, MapStyle, MemberRole,
    NotificationType, PaymentStatus, VibeCategory,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PublicProfile {
    pub id: String,
    pub avatar_url: Option<String>,
    pub username: Option<String>,
    pub display_name: String,
    pub bio: Option<String>,
    pub age_years: Option<i64>,
    pub gender: Option<String>,
    pub reputation_score: i64,
    pub is_verified: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSettings {
    pub id: String,
    pub user_id: String,
    pub appearance_mode: AppearanceMode,
    pub map_style: MapStyle,
    pub map_center_latitude: f64,
    pub map_center_longitude: f64,
    pub map_zoom_level: f64,
    pub map_start_date: Option<NaiveDateTime>,
    pub map_end_date: Option<NaiveDateTime>,
    pub map_max_distance: Option<f64>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub details: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state_region: Option<String>,
    pub room_number: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub max_capacity: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vibe {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub category: VibeCategory,
    pub system_defined: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventItem {
    pub id: String,
    pub status: EventStatus,
    pub name: String,
    pub details: Option<String>,
    pub brand_color: String,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
    pub is_all_day: bool,
    pub location_id: Option<String>,
    pub max_capacity: i64,
    pub visibility: EventVisibility,
    pub invite_link: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: String,
    pub role: MemberRole,
    pub user_id: String,
    pub display_name: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub event_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invite {
    pub id: String,
    pub user_id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub invite_type: InviteType,
    pub status: InviteStatus,
    pub token: Option<String>,
    pub expires_at: Option<NaiveDateTime>,
    pub event_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Media {
    pub id: String,
    pub url: String,
    pub position: i64,
    pub mime_type: Option<String>,
    pub average_color_hex: Option<String>,
    pub event_id: Option<String>,
    pub user_profile_id: Option<String>,
    pub public_profile_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserNotification {
    pub id: String,
    pub user_id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub timestamp: NaiveDateTime,
    pub is_unread: bool,
    pub user_name: Option<String>,
    pub user_avatar: Option<String>,
    pub event_name: Option<String>,
    pub event_id: Option<String>,
    pub event_color: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub metadata: Option<String>,
    pub primary_action: Option<String>,
    pub secondary_action: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub sold: i64,
    pub expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: String,
    pub ticket_id: String,
    pub user_id: String,
    pub status: PaymentStatus,
    pub amount_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
