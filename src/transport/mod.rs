//! Transport boundary.
//!
//! The SDK only needs two things from the network: a read-only `eth_call` returning raw bytes and
//! `eth_estimateGas`. Both surface reverts as [`TransportError::Revert`].

use alloy::{
    primitives::{Address, Bytes},
    providers::Provider,
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use std::{fmt, sync::Arc};
use tracing::{instrument, trace};

mod error;
pub use error::{TransportError, decode_revert_reason};

/// Type alias for `Result<T, TransportError>`
pub type Result<T> = core::result::Result<T, TransportError>;

/// Network capability consumed by the SDK.
#[async_trait]
pub trait ChainTransport: fmt::Debug + Send + Sync {
    /// Performs a read-only call and returns the raw return data.
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes>;

    /// Estimates the gas of a state-changing call.
    async fn estimate_gas(&self, to: Address, input: Bytes) -> Result<u64>;
}

#[async_trait]
impl<T: ChainTransport + ?Sized> ChainTransport for Arc<T> {
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes> {
        (**self).call(to, input).await
    }

    async fn estimate_gas(&self, to: Address, input: Bytes) -> Result<u64> {
        (**self).estimate_gas(to, input).await
    }
}

/// A [`ChainTransport`] backed by an alloy [`Provider`].
#[derive(Clone)]
pub struct ProviderTransport<P> {
    provider: P,
    from: Option<Address>,
}

impl<P> fmt::Debug for ProviderTransport<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderTransport").field("from", &self.from).finish_non_exhaustive()
    }
}

impl<P> ProviderTransport<P> {
    /// Create a new instance of [`ProviderTransport`].
    pub fn new(provider: P) -> Self {
        Self { provider, from: None }
    }

    /// Sets the sender used for calls and gas estimation.
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Returns the sender, if any.
    pub fn sender(&self) -> Option<Address> {
        self.from
    }

    fn request(&self, to: Address, input: Bytes) -> TransactionRequest {
        let request = TransactionRequest::default().to(to).input(input.into());
        match self.from {
            Some(from) => request.from(from),
            None => request,
        }
    }
}

#[async_trait]
impl<P: Provider> ChainTransport for ProviderTransport<P> {
    #[instrument(skip(self, input), fields(input_len = input.len()))]
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes> {
        let request = self.request(to, input);
        trace!(?request, "eth_call");
        Ok(self.provider.call(request).await?)
    }

    #[instrument(skip(self, input), fields(input_len = input.len()))]
    async fn estimate_gas(&self, to: Address, input: Bytes) -> Result<u64> {
        let request = self.request(to, input);
        trace!(?request, "eth_estimateGas");
        Ok(self.provider.estimate_gas(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        primitives::{TxKind, address, bytes},
        providers::ProviderBuilder,
    };

    #[test]
    fn builds_requests_from_sender() {
        let provider = ProviderBuilder::new().connect_http("http://localhost:8545".parse().unwrap());
        let to = address!("0x59828fdf7ee634aaad3f58b19fdba3b03e2d9d80");
        let sender = address!("0x00000000000000000000000000000000000a11ce");

        let transport = ProviderTransport::new(provider);
        assert_eq!(transport.sender(), None);
        assert_eq!(transport.request(to, bytes!("0x1234")).from, None);

        let transport = transport.with_from(sender);
        assert_eq!(transport.sender(), Some(sender));

        let request = transport.request(to, bytes!("0x1234"));
        assert_eq!(request.from, Some(sender));
        assert_eq!(request.to, Some(TxKind::Call(to)));
        assert_eq!(request.input.input(), Some(&bytes!("0x1234")));
    }
}
