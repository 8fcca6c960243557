//! # Node Runtime
//!
//! Configuration loading and component wiring for the gateway binary.

pub mod container;

pub use container::{ConfigError, NodeConfig, NodeContainer};
