use alloy::primitives::Bytes;

/// Errors related to compiling and decoding batches.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The call could not be encoded against the contract interface.
    #[error("could not encode {method}: {reason}")]
    Encoding {
        /// The method that was encoded.
        method: String,
        /// Why encoding failed.
        reason: String,
    },
    /// Return data could not be decoded.
    #[error("could not decode {method}: {reason}")]
    Decoding {
        /// The method whose return data was decoded.
        method: String,
        /// Why decoding failed.
        reason: String,
    },
    /// The number of responses does not match the number of batch items.
    #[error("expected {expected} responses, got {got}")]
    LengthMismatch {
        /// Number of batch items.
        expected: usize,
        /// Number of responses.
        got: usize,
    },
    /// The simulation call did not revert with the expected simulation trace.
    #[error("unexpected simulation result: {0}")]
    UnexpectedSimulation(Bytes),
}

impl BatchError {
    /// Creates a [`BatchError::Encoding`].
    pub fn encoding(method: impl Into<String>, reason: impl ToString) -> Self {
        Self::Encoding { method: method.into(), reason: reason.to_string() }
    }

    /// Creates a [`BatchError::Decoding`].
    pub fn decoding(method: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decoding { method: method.into(), reason: reason.to_string() }
    }
}
