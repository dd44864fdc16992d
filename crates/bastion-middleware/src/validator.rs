//! Assembly-time checks on the chain list.

use crate::chain::SecurityFilterChain;
use bastion_core::{SecurityError, SecurityResult};
use std::sync::Arc;

/// Inspects the assembled chains once, when the engine is built.
///
/// A failing validator prevents the engine from being built, so a
/// misconfiguration never reaches traffic.
pub trait ChainValidator: Send + Sync + 'static {
    /// Validates the chains in dispatch order.
    fn validate(&self, chains: &[Arc<SecurityFilterChain>]) -> SecurityResult<()>;
}

/// Accepts every configuration. The engine's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChainValidator;

impl ChainValidator for NoopChainValidator {
    fn validate(&self, _chains: &[Arc<SecurityFilterChain>]) -> SecurityResult<()> {
        Ok(())
    }
}

/// Rejects configurations where a chain can never be selected because a
/// chain matching every request comes before it.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreachableChainValidator;

impl ChainValidator for UnreachableChainValidator {
    fn validate(&self, chains: &[Arc<SecurityFilterChain>]) -> SecurityResult<()> {
        let Some(universal) = chains
            .iter()
            .position(|chain| chain.matcher().matches_any_request())
        else {
            return Ok(());
        };

        match chains.get(universal + 1) {
            Some(shadowed) => Err(SecurityError::invalid_configuration(format!(
                "a chain matching any request ({}) is configured before {}, which will never be invoked; \
                 move the universal chain to the end of the list",
                chains[universal], shadowed
            ))),
            None => Ok(()),
        }
    }
}
