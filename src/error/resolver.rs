use crate::types::TokenKind;
use alloy::primitives::Address;

/// Errors returned while resolving a contract reference.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolverError {
    /// The address is empty or not a 20-byte hex string.
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),
    /// The reference names neither a registered module nor a token role.
    #[error("unknown contract {0}")]
    UnknownContract(String),
    /// The markets module has no token of this kind for the underlying asset.
    #[error("no {kind} for underlying {underlying}")]
    NoTokenForUnderlying {
        /// The kind of token that was looked up.
        kind: TokenKind,
        /// The underlying asset.
        underlying: Address,
    },
}
