//! Shared library for the Seshy backend services
//!
//! Contains the error type, configuration resolution, domain enums, database
//! schema/models, and the system vibe seeding routine used at service boot.

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod tokens;

pub use error::{Error, Result};

/// UUID of the bootstrap anonymous profile created at database init.
///
/// The auth layer resolves unauthenticated requests to this profile until
/// real token parsing lands.
pub const ANONYMOUS_PROFILE_ID: uuid::Uuid = uuid::Uuid::from_u128(1);
