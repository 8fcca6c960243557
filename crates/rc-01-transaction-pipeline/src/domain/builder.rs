//! Transaction assembly. Pure: no I/O, no signing.

use shared_types::{parse_address, Address};

use super::envelope::TransactionEnvelope;
use super::errors::PipelineError;
use super::gas::ResolvedGas;

/// Assembles an envelope from a resolved gas triple.
///
/// A creation (`to == None`) must carry init code.
pub fn build(
    to: Option<Address>,
    payload: Vec<u8>,
    resolved: &ResolvedGas,
    chain_id: u64,
) -> Result<TransactionEnvelope, PipelineError> {
    check_payload(to.as_ref(), &payload)?;
    Ok(TransactionEnvelope {
        nonce: resolved.nonce,
        gas_price: resolved.gas_price,
        gas_limit: resolved.gas_limit,
        to,
        data: payload,
        chain_id,
    })
}

/// Structural check run before any chain I/O.
pub fn check_payload(to: Option<&Address>, payload: &[u8]) -> Result<(), PipelineError> {
    if to.is_none() && payload.is_empty() {
        return Err(PipelineError::EmptyCreationPayload);
    }
    Ok(())
}

/// Validates a textual recipient before it reaches [`build`].
pub fn parse_recipient(value: &str) -> Result<Address, PipelineError> {
    parse_address(value).map_err(PipelineError::from)
}
