//! Authentication stub
//!
//! Token parsing is out of scope for this service; every request resolves to
//! the anonymous bootstrap profile. Handlers take the user id through this
//! one seam so a real extractor can replace it without touching them.

use seshy_common::ANONYMOUS_PROFILE_ID;
use uuid::Uuid;

/// Resolve the requesting user's profile id.
pub fn current_user_id() -> Uuid {
    ANONYMOUS_PROFILE_ID
}
