//! Wire and result types of batches.

use super::EulerBatchItem;
use crate::transport::decode_revert_reason;
use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes},
};

/// The minimal `(target, payload, error tolerance)` tuple the dispatcher consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireDispatchEntry {
    /// Whether a failure of this entry is tolerated.
    pub allow_error: bool,
    /// Address of the called contract.
    pub target: Address,
    /// Encoded call data.
    pub payload: Bytes,
}

impl From<WireDispatchEntry> for EulerBatchItem {
    fn from(entry: WireDispatchEntry) -> Self {
        Self { allowError: entry.allow_error, proxyAddr: entry.target, data: entry.payload }
    }
}

/// A ready-to-send `batchDispatch` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    /// The execution module.
    pub to: Address,
    /// Encoded `batchDispatch` call data.
    pub input: Bytes,
}

/// The decoded outcome of a batch item.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchItemResult {
    /// The call succeeded and its return data was decoded.
    Success(Vec<DynSolValue>),
    /// The call failed, or its return data could not be decoded.
    Failure(BatchItemError),
}

impl BatchItemResult {
    /// Whether the item succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the decoded values of a successful item.
    pub fn values(&self) -> Option<&[DynSolValue]> {
        match self {
            Self::Success(values) => Some(values),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error of a failed item.
    pub const fn error(&self) -> Option<&BatchItemError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err),
        }
    }
}

/// Describes why a batch item failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchItemError {
    /// The item reverted with a string reason.
    #[error("{reason}")]
    Reverted {
        /// The normalized revert reason.
        reason: String,
        /// Raw revert data.
        data: Bytes,
    },
    /// The raw result could not be interpreted.
    #[error("{error}")]
    Undecodable {
        /// The decode error.
        error: String,
        /// Raw result data.
        data: Bytes,
    },
}

impl BatchItemError {
    /// Builds an error from a raw failure payload, preferring an `Error(string)` reason over
    /// `fallback`.
    pub fn from_payload(data: &Bytes, fallback: impl Into<String>) -> Self {
        match decode_revert_reason(data) {
            Some(reason) => Self::Reverted { reason, data: data.clone() },
            None => Self::Undecodable { error: fallback.into(), data: data.clone() },
        }
    }

    /// Returns the human readable reason.
    pub fn reason(&self) -> &str {
        match self {
            Self::Reverted { reason, .. } => reason,
            Self::Undecodable { error, .. } => error,
        }
    }

    /// Returns the raw payload.
    pub fn data(&self) -> &Bytes {
        match self {
            Self::Reverted { data, .. } | Self::Undecodable { data, .. } => data,
        }
    }
}
