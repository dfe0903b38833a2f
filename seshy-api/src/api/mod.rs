//! HTTP API handlers for seshy-api

pub mod error;
pub mod events;
pub mod health;
pub mod invites;
pub mod media;
pub mod members;
pub mod notifications;
pub mod payments;
pub mod places;
pub mod profiles;
pub mod tickets;
pub mod vibes;

pub use error::ApiError;
