//! Router layers.

pub mod cors;
pub mod tracing;

pub use self::cors::create_cors_layer;
pub use self::tracing::{request_trace_layer, RequestSpan};
