//! HTTP routes.

pub mod courses;
pub mod health;

pub use courses::course_routes;
pub use health::health_routes;
