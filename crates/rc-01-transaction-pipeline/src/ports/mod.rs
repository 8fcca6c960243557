//! Ports: the pipeline's inbound API and the chain it depends on.

pub mod inbound;
pub mod outbound;

pub use inbound::{ExecutionOutcome, TransactionRequest, TransactionSubmitter};
pub use outbound::{CallRequest, ChainRpc, RpcError, SystemTimeSource, TimeSource};
