pub mod config;
pub mod error;
pub mod requests;

pub use config::{ChainInfo, ConfigError, CorsConfig, DefaultKey, GatewayConfig, HttpConfig};
pub use error::{ApiError, GatewayError};
