//! Adapters for the outbound ports.

pub mod http_rpc;

pub use http_rpc::{HttpChainClient, HttpClientConfig};
