//! SignVote gesture server.
//!
//! This crate provides:
//! - The frame loop wiring a landmark source to the gesture pipeline
//! - A change-driven NDJSON record stream and spoken vote feedback
//! - A read-only HTTP API serving the latest gesture
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod runner;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use routes::create_router;
pub use runner::{open_output, open_source, FrameRunner, RunSummary, StopReason};
pub use state::AppState;
