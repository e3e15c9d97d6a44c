//! # Vastra Hub
//!
//! HTTP surface for the responder: the chat API, request logging and
//! rate limiting middleware, and runtime metrics.

pub mod api;
pub mod metrics;
pub mod middleware;

pub use api::{AppState, SharedState, build_router, start_server};
