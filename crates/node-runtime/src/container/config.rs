//! Node configuration: defaults, environment overlay and validation.
//!
//! | Variable | Default |
//! |---|---|
//! | `HOST` / `PORT` | `0.0.0.0` / `4001` |
//! | `BLOCKCHAIN_URL` | `http://localhost:8545` |
//! | `BLOCKCHAIN_CHAIN_ID` | `1337` |
//! | `PRIVATE_KEY` | unset |
//! | `FORCE_ZERO_GAS` | `false` |
//! | `GAS_PRICE_FLOOR_WEI` | 1 Gwei |
//! | `GAS_BUFFER_PERCENT` | `20` |
//! | `RPC_TIMEOUT_SECS` | `30` |
//! | `RECEIPT_POLL_MS` | `500` |
//! | `RECEIPT_TIMEOUT_SECS` | unset |
//! | `DEPLOYMENT_DIR` | `.` |
//! | `ARTIFACT_DIR` | `./compiled` |
//!
//! A value that fails to parse is logged and the default kept.

use rc_01_transaction_pipeline::domain::gas::{DEFAULT_GAS_BUFFER_PERCENT, ONE_GWEI};
use rc_05_api_gateway::DefaultKey;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    pub server: ServerConfig,
    pub chain: ChainConfig,
    pub gas: GasConfig,
    pub receipts: ReceiptConfig,
    pub storage: StorageConfig,
    /// Fallback signer for write requests without `privateKey`.
    pub signer: DefaultKey,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4001,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub url: String,
    pub chain_id: u64,
    pub rpc_timeout: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            chain_id: 1337,
            rpc_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GasConfig {
    /// Accept a zero gas price instead of substituting the floor.
    pub force_zero_gas: bool,
    pub price_floor_wei: u64,
    pub buffer_percent: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            force_zero_gas: false,
            price_floor_wei: ONE_GWEI,
            buffer_percent: DEFAULT_GAS_BUFFER_PERCENT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReceiptConfig {
    pub poll_interval: Duration,
    /// `None` waits for the receipt indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub deployment_dir: PathBuf,
    pub artifact_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            deployment_dir: PathBuf::from("."),
            artifact_dir: PathBuf::from("./compiled"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("PORT cannot be 0")]
    ZeroPort,
    #[error("BLOCKCHAIN_CHAIN_ID cannot be 0")]
    ZeroChainId,
    #[error("BLOCKCHAIN_URL must start with http:// or https://: {0}")]
    InvalidChainUrl(String),
    #[error("RECEIPT_POLL_MS cannot be 0")]
    ZeroPollInterval,
}

impl NodeConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns per variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let env = Overlay { lookup: &lookup };

        env.parse("HOST", &mut config.server.host);
        env.parse("PORT", &mut config.server.port);

        if let Some(url) = env.get("BLOCKCHAIN_URL") {
            config.chain.url = url;
        }
        env.parse("BLOCKCHAIN_CHAIN_ID", &mut config.chain.chain_id);
        env.secs("RPC_TIMEOUT_SECS", &mut config.chain.rpc_timeout);

        config.signer = DefaultKey::new(env.get("PRIVATE_KEY"));

        env.flag("FORCE_ZERO_GAS", &mut config.gas.force_zero_gas);
        env.parse("GAS_PRICE_FLOOR_WEI", &mut config.gas.price_floor_wei);
        env.parse("GAS_BUFFER_PERCENT", &mut config.gas.buffer_percent);

        let mut poll_ms = config.receipts.poll_interval.as_millis() as u64;
        env.parse("RECEIPT_POLL_MS", &mut poll_ms);
        config.receipts.poll_interval = Duration::from_millis(poll_ms);
        if env.get("RECEIPT_TIMEOUT_SECS").is_some() {
            let mut timeout = Duration::ZERO;
            if env.secs("RECEIPT_TIMEOUT_SECS", &mut timeout) {
                config.receipts.timeout = Some(timeout);
            }
        }

        if let Some(dir) = env.get("DEPLOYMENT_DIR") {
            config.storage.deployment_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env.get("ARTIFACT_DIR") {
            config.storage.artifact_dir = PathBuf::from(dir);
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.chain.chain_id == 0 {
            return Err(ConfigError::ZeroChainId);
        }
        if !self.chain.url.starts_with("http://") && !self.chain.url.starts_with("https://") {
            return Err(ConfigError::InvalidChainUrl(self.chain.url.clone()));
        }
        if self.receipts.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

struct Overlay<'a, F: Fn(&str) -> Option<String>> {
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<String>> Overlay<'_, F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Returns whether `target` was overwritten.
    fn parse<T: FromStr>(&self, name: &str, target: &mut T) -> bool {
        let Some(raw) = self.get(name) else {
            return false;
        };
        match raw.parse() {
            Ok(value) => {
                *target = value;
                true
            }
            Err(_) => {
                warn!(variable = name, value = %raw, "Ignoring invalid value, keeping default");
                false
            }
        }
    }

    fn secs(&self, name: &str, target: &mut Duration) -> bool {
        let mut secs = target.as_secs();
        let set = self.parse(name, &mut secs);
        if set {
            *target = Duration::from_secs(secs);
        }
        set
    }

    fn flag(&self, name: &str, target: &mut bool) {
        let Some(raw) = self.get(name) else {
            return;
        };
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => *target = true,
            "0" | "false" | "no" | "off" => *target = false,
            _ => warn!(variable = name, value = %raw, "Ignoring invalid flag, keeping default"),
        }
    }
}
