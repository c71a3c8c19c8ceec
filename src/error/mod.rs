//! SDK error types.
use crate::transport::TransportError;
use thiserror::Error;

mod batch;
pub use batch::BatchError;

mod permit;
pub use permit::PermitError;

mod resolver;
pub use resolver::ResolverError;

/// Type alias for `Result<T, SdkError>`.
pub type Result<T, E = SdkError> = core::result::Result<T, E>;

/// The overarching error type returned by the SDK.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Errors related to contract resolution.
    #[error(transparent)]
    Resolver(#[from] ResolverError),
    /// Errors related to building or decoding batches.
    #[error(transparent)]
    Batch(#[from] BatchError),
    /// Errors related to permit signing.
    #[error(transparent)]
    Permit(#[from] PermitError),
    /// An error returned by the transport, passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The sub-account id is out of range.
    #[error("invalid sub-account id: {0}")]
    InvalidSubAccountId(u32),
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] eyre::Error),
}

impl SdkError {
    /// Returns the inner [`TransportError`] if this is a transport error.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the revert reason, if this error is an on-chain revert carrying one.
    pub fn revert_reason(&self) -> Option<String> {
        self.as_transport().and_then(TransportError::revert_reason)
    }
}
