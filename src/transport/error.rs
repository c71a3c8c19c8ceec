//! Additional helpers for RPC error handling

use alloy::{
    primitives::Bytes,
    sol_types::{Revert, SolError},
};

/// An error returned by a [`ChainTransport`](super::ChainTransport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The call reverted on-chain.
    #[error("{message}")]
    Revert {
        /// The raw revert payload, empty if the node did not return one.
        data: Bytes,
        /// The message reported by the node.
        message: String,
    },
    /// Any other RPC failure, passed through unchanged.
    #[error(transparent)]
    Rpc(alloy::transports::TransportError),
}

impl TransportError {
    /// Creates a [`TransportError::Revert`] from raw revert data.
    pub fn revert(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let message = match decode_revert_reason(&data) {
            Some(reason) => format!("execution reverted: {reason}"),
            None => "execution reverted".to_string(),
        };
        Self::Revert { data, message }
    }

    /// Returns the raw revert data if this is a revert.
    pub fn revert_data(&self) -> Option<&Bytes> {
        match self {
            Self::Revert { data, .. } => Some(data),
            Self::Rpc(_) => None,
        }
    }

    /// Returns the revert reason.
    ///
    /// Prefers the `Error(string)` payload and falls back to the node message, since some nodes
    /// only report the reason as text on `eth_estimateGas`.
    pub fn revert_reason(&self) -> Option<String> {
        let Self::Revert { data, message } = self else { return None };
        decode_revert_reason(data).or_else(|| (!message.is_empty()).then(|| message.clone()))
    }
}

impl From<alloy::transports::TransportError> for TransportError {
    fn from(err: alloy::transports::TransportError) -> Self {
        if let Some(resp) = err.as_error_resp() {
            if let Some(data) = resp.as_revert_data() {
                return Self::Revert { data, message: resp.message.to_string() };
            }
            if resp.message.contains("revert") {
                return Self::Revert { data: Bytes::new(), message: resp.message.to_string() };
            }
        }
        Self::Rpc(err)
    }
}

/// Decodes a string-encoded `Error(string)` revert reason.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data).ok().map(|revert| revert.reason.trim().to_string())
}
