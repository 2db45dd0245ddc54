//! HTTP middleware.

pub mod cors;
pub mod origin;

pub use cors::build_cors_layer;
pub use origin::{OriginAllowList, OriginLayer};
