//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub http: HttpConfig,
    pub cors: CorsConfig,
    /// Chain the gateway reports in `GET /`
    pub chain: ChainInfo,
    /// Signer used when a write request carries no `privateKey`
    #[serde(skip)]
    pub default_key: DefaultKey,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Invalid("http port cannot be 0".into()));
        }
        if !self.chain.url.starts_with("http://") && !self.chain.url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "chain url must be http(s): {}",
                self.chain.url
            )));
        }
        if self.chain.chain_id == 0 {
            return Err(ConfigError::Invalid("chain id cannot be 0".into()));
        }
        self.cors.validate()
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: IpAddr,
    /// Port (default: 4001)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainInfo {
    pub url: String,
    pub chain_id: u64,
}

impl Default for ChainInfo {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            chain_id: 1337,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    /// Allowed headers ("*" for all)
    pub allowed_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    /// Max age for preflight cache, in seconds
    pub max_age: u64,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS", "HEAD"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: ["Origin", "X-Requested-With", "Content-Type", "Accept"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            expose_headers: vec![],
            max_age: 86400, // 24 hours
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if let Some(bad) = self
            .allowed_methods
            .iter()
            .find(|m| m.parse::<axum::http::Method>().is_err())
        {
            return Err(ConfigError::Invalid(format!("invalid CORS method: {}", bad)));
        }
        // tower-http refuses credentials combined with a wildcard origin
        if self.allow_credentials && self.allowed_origins.iter().any(|o| o == "*") {
            return Err(ConfigError::Invalid(
                "CORS credentials cannot be combined with origin \"*\"".into(),
            ));
        }
        Ok(())
    }
}

/// Optional fallback signing key. Never printed.
#[derive(Clone, Default)]
pub struct DefaultKey(Option<String>);

impl DefaultKey {
    pub fn new(key: Option<String>) -> Self {
        Self(key.filter(|k| !k.trim().is_empty()))
    }

    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Debug for DefaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("DefaultKey(<redacted>)"),
            None => f.write_str("DefaultKey(None)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http_addr().port(), 4001);
        assert!(config.cors.allowed_methods.contains(&"HEAD".to_string()));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = GatewayConfig::default();
        config.chain.url = "localhost:8545".into();
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.http.port = 0;
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.cors.allow_credentials = true;
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.cors.allowed_methods.push("BAD METHOD".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_key_is_redacted() {
        let key = DefaultKey::new(Some("ab".repeat(32)));
        assert_eq!(format!("{:?}", key), "DefaultKey(<redacted>)");
        assert!(key.get().is_some());
        assert!(DefaultKey::new(Some("  ".into())).get().is_none());
    }
}
