//! # Record Chain API Gateway
//!
//! axum HTTP surface over the deployment manager and the record stores.
//!
//! ## Layers
//!
//! | Layer | Purpose |
//! |---|---|
//! | `TraceLayer` | `http_request{method, path}` span with status and latency |
//! | `CorsLayer` | origins, methods and headers from [`CorsConfig`] |
//!
//! Every error body is `{"error": message}` with the status chosen by
//! [`ApiError`]; unknown routes answer 404 with the method and path.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

pub use domain::*;
pub use router::{build_router, AppState};
pub use service::ApiGatewayService;
