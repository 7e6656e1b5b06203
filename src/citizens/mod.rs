//! Citizen registry
//!
//! Registration is idempotent per email. Profile updates may only touch
//! the display name and photo; entitlement, role and blocked flags are not
//! writable through this surface.

mod registry;

pub use registry::{
    require_email, require_email_address, CitizenRegistry, ProfileUpdateRequest,
    RegisterCitizenRequest, RegisterOutcome,
};
