//! # Gas Policies
//!
//! Both gas price and gas limit are explicit policy values chosen by the
//! caller, never silent defaults buried in the resolver.
//!
//! | Policy | Chain reports | Result |
//! |---|---|---|
//! | `GasPricePolicy::Floor(f)` | `0` or empty | `f` |
//! | `GasPricePolicy::Floor(f)` | `p > 0` | `p` |
//! | `GasPricePolicy::AllowZero` | `p` | `p` |
//! | `GasLimitPolicy::Fixed(n)` | – | `n` |
//! | `GasLimitPolicy::Estimate` | estimate `e` | `min(e * (100 + buffer) / 100, cap)` |
//! | `GasLimitPolicy::Estimate` | estimation error | `fallback` |

use shared_types::U256;

/// 1 Gwei, the floor substituted for a zero gas price.
pub const ONE_GWEI: u64 = 1_000_000_000;

/// Fixed limit for the five-field record store calls.
pub const RECORD_STORE_GAS_LIMIT: u64 = 800_000;

/// Fixed limit for single-value writes.
pub const SIMPLE_SET_GAS_LIMIT: u64 = 300_000;

/// Safety margin applied on top of `eth_estimateGas`.
pub const DEFAULT_GAS_BUFFER_PERCENT: u64 = 20;

/// How a zero gas price reported by the chain is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPricePolicy {
    /// Substitute the given floor when the chain reports zero.
    Floor(U256),
    /// Use whatever the chain reports, zero included (free-gas networks).
    AllowZero,
}

impl GasPricePolicy {
    pub fn apply(&self, reported: U256) -> U256 {
        match self {
            GasPricePolicy::Floor(floor) if reported.is_zero() => *floor,
            _ => reported,
        }
    }
}

impl Default for GasPricePolicy {
    fn default() -> Self {
        GasPricePolicy::Floor(U256::from(ONE_GWEI))
    }
}

/// How the gas limit of one transaction is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasLimitPolicy {
    Fixed(u64),
    Estimate {
        fallback: u64,
        buffer_percent: u64,
        cap: Option<u64>,
    },
}

impl GasLimitPolicy {
    /// Estimate with the default buffer, falling back to `fallback`.
    pub fn estimated(fallback: u64) -> Self {
        GasLimitPolicy::Estimate {
            fallback,
            buffer_percent: DEFAULT_GAS_BUFFER_PERCENT,
            cap: None,
        }
    }

    /// Estimate, never exceeding `cap`; `cap` doubles as the fallback.
    pub fn estimated_with_cap(cap: u64, buffer_percent: u64) -> Self {
        GasLimitPolicy::Estimate {
            fallback: cap,
            buffer_percent,
            cap: Some(cap),
        }
    }

    pub fn needs_estimate(&self) -> bool {
        matches!(self, GasLimitPolicy::Estimate { .. })
    }

    /// Final limit given the estimate outcome (`None` if estimation failed).
    pub fn resolve(&self, estimate: Option<u64>) -> u64 {
        match *self {
            GasLimitPolicy::Fixed(limit) => limit,
            GasLimitPolicy::Estimate {
                fallback,
                buffer_percent,
                cap,
            } => match estimate {
                Some(estimate) => {
                    let buffered = apply_buffer(estimate, buffer_percent);
                    cap.map_or(buffered, |cap| buffered.min(cap))
                }
                None => fallback,
            },
        }
    }
}

/// `estimate * (100 + percent) / 100`, saturating at `u64::MAX`.
pub fn apply_buffer(estimate: u64, percent: u64) -> u64 {
    let scaled = u128::from(estimate) * (100 + u128::from(percent)) / 100;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// The triple a transaction cannot be signed without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedGas {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
}
