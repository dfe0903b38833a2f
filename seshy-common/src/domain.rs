//! Domain enums shared across services
//!
//! Every integer-coded classification in the schema has a named enum with an
//! explicit discriminant. Storage keeps the integer encoding; JSON uses the
//! variant name.

use serde::{Deserialize, Serialize};

/// Classification for vibe tags.
///
/// `Custom` is reserved for user-created tags and never appears in the
/// canonical system list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i64)]
#[serde(rename_all = "snake_case")]
pub enum VibeCategory {
    Custom = 0,
    Energy = 1,
    Locale = 2,
    Hobbies = 3,
    Music = 4,
    Cultural = 5,
    Degree = 6,
    ClassStanding = 7,
}

/// Role of a member within an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i64)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Host = 0,
    Staff = 1,
    Guest = 2,
}

/// Direction of an invite: host-initiated or a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i64)]
#[serde(rename_all = "snake_case")]
pub enum InviteType {
    Invite = 0,
    Request = 1,
}

/// Lifecycle of an invite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i64)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending = 0,
    Approved = 1,
    Declined = 2,
    Expired = 3,
    Revoked = 4,
}

/// Schedule status of an event (persisted encoding)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i64)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming = 0,
    Live = 1,
    Cancelled = 2,
    Ended = 3,
}

impl EventStatus {
    /// Statuses that can no longer transition
    pub fn is_final(self) -> bool {
        matches!(self, EventStatus::Cancelled | EventStatus::Ended)
    }
}

/// Who can see and join an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i64)]
#[serde(rename_all = "snake_case")]
pub enum EventVisibility {
    OnlyUser = 0,
    DirectInvites = 1,
    RequiresApproval = 2,
    OpenToAll = 3,
}

/// UI appearance preference stored in user settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i64)]
#[serde(rename_all = "snake_case")]
pub enum AppearanceMode {
    System = 0,
    DarkMode = 1,
    LightMode = 2,
}

/// Map rendering style stored in user settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i64)]
#[serde(rename_all = "snake_case")]
pub enum MapStyle {
    DarkMap = 0,
    LightMap = 1,
    Streets = 2,
    Outdoors = 3,
    Satellite = 4,
    SatelliteStreets = 5,
}

/// Notification kinds surfaced to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i64)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    InviteReceived = 0,
    InviteApproved = 1,
    RequestReceived = 2,
    EventUpdated = 3,
    EventCancelled = 4,
    PaymentSucceeded = 5,
}

/// Payment lifecycle. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Refunded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_status_finality() {
        assert!(!EventStatus::Upcoming.is_final());
        assert!(!EventStatus::Live.is_final());
        assert!(EventStatus::Cancelled.is_final());
        assert!(EventStatus::Ended.is_final());
    }

    #[test]
    fn persisted_discriminants_are_stable() {
        // These values are written to disk; changing them is a migration.
        assert_eq!(MemberRole::Host as i64, 0);
        assert_eq!(MemberRole::Staff as i64, 1);
        assert_eq!(MemberRole::Guest as i64, 2);
        assert_eq!(InviteStatus::Pending as i64, 0);
        assert_eq!(InviteStatus::Approved as i64, 1);
        assert_eq!(EventStatus::Cancelled as i64, 2);
        assert_eq!(EventStatus::Ended as i64, 3);
        assert_eq!(VibeCategory::ClassStanding as i64, 7);
    }
}
