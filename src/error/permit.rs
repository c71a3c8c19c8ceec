use alloy::primitives::Address;

/// Errors related to permit signing.
#[derive(Debug, thiserror::Error)]
pub enum PermitError {
    /// The token does not declare a permit configuration.
    #[error("token {0} has no permit config")]
    MissingPermitConfig(Address),
    /// The permit configuration names a standard this crate does not know.
    #[error("unsupported permit standard: {0}")]
    UnsupportedPermitStandard(String),
    /// No signer is connected.
    #[error("no signer available")]
    MissingSigner,
    /// The typed data could not be hashed.
    #[error(transparent)]
    TypedData(#[from] alloy::dyn_abi::Error),
    /// The signer failed to sign.
    #[error(transparent)]
    Signing(#[from] alloy::signers::Error),
}
