//! API layer
//!
//! HTTP handlers for:
//! - Comment tree endpoints
//! - Friend graph endpoints
//! - User discovery
//! - Metrics (Prometheus)

mod comments;
mod converters;
mod dto;
mod friends;
pub mod metrics;
mod users;

pub use converters::*;
pub use dto::*;

pub use comments::comments_router;
pub use friends::friends_router;
pub use metrics::metrics_router;
pub use users::users_router;
