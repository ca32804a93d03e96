//! HTTP request handlers.

pub mod health;
pub mod live;
pub mod todos;

pub use health::{health_check, readiness_check};
