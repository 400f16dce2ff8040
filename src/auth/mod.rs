//! Bearer-token authentication
//!
//! Token issuance belongs to the external auth collaborator; this module
//! only resolves presented tokens to a caller identity:
//! - Token extraction (Authorization header or session cookie)
//! - `CurrentUser` extractor for handlers

mod middleware;
mod token;

pub use middleware::{AuthUser, CurrentUser};
pub use token::generate_access_token;
