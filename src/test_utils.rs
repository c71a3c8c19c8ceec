//! Shared fixtures of unit tests.

use crate::{
    config::NetworkConfig,
    resolver::ContractResolver,
    transport::{ChainTransport, Result, TransportError},
    types::Module,
};
use alloy::{
    primitives::{Address, Bytes, address},
    transports::TransportErrorKind,
};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Mutex};

pub(crate) const EULER: Address = address!("0x27182842e098f60e3d576794a5bffb0777e025d3");
pub(crate) const EXEC: Address = address!("0x59828fdf7ee634aaad3f58b19fdba3b03e2d9d80");
pub(crate) const LIQUIDATION: Address = address!("0xf43ce1d09050bafd6980dd43cde2ab9f18c85b34");
pub(crate) const MARKETS: Address = address!("0x3520d5a913427e6f0d6a83e07ccd4a4da316e4d3");
pub(crate) const SWAP: Address = address!("0x7123c8cbbd76c5c7fcc9f7150f23179bec0ba341");
pub(crate) const TOKEN: Address = address!("0x1f9840a85d5af5bf1d1762f925bdaddc4201f984");
pub(crate) const ACCOUNT: Address = address!("0x00000000000000000000000000000000000a11ce");

/// Network configuration with every required module.
pub(crate) fn test_config() -> NetworkConfig {
    NetworkConfig::new(1)
        .with_address(Module::Euler.name(), EULER)
        .with_address(Module::Exec.name(), EXEC)
        .with_address(Module::Liquidation.name(), LIQUIDATION)
        .with_address(Module::Markets.name(), MARKETS)
        .with_address(Module::Swap.name(), SWAP)
}

pub(crate) fn test_resolver() -> ContractResolver {
    test_config().resolver().unwrap()
}

/// Canned response of a [`MockTransport`].
#[derive(Debug, Clone)]
pub(crate) enum MockResponse {
    Return(Bytes),
    Revert(Bytes),
    RevertMessage(String),
    Gas(u64),
}

/// A transport answering by target and selector.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    responses: HashMap<(Address, [u8; 4]), MockResponse>,
    calls: Mutex<Vec<(Address, Bytes)>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_call(mut self, to: Address, selector: [u8; 4], response: MockResponse) -> Self {
        self.responses.insert((to, selector), response);
        self
    }

    /// All requests, in order.
    pub(crate) fn calls(&self) -> Vec<(Address, Bytes)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, to: Address, selector: [u8; 4]) -> usize {
        self.calls()
            .iter()
            .filter(|(target, input)| *target == to && input.starts_with(&selector))
            .count()
    }

    fn respond(&self, to: Address, input: Bytes) -> Result<&MockResponse> {
        let selector = input.get(..4).and_then(|selector| <[u8; 4]>::try_from(selector).ok());
        self.calls.lock().unwrap().push((to, input));
        selector
            .and_then(|selector| self.responses.get(&(to, selector)))
            .ok_or_else(|| unexpected(to))
    }
}

fn unexpected(to: Address) -> TransportError {
    TransportError::Rpc(TransportErrorKind::custom_str(&format!("unexpected request to {to}")))
}

#[async_trait]
impl ChainTransport for MockTransport {
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes> {
        match self.respond(to, input)? {
            MockResponse::Return(output) => Ok(output.clone()),
            MockResponse::Revert(data) => Err(TransportError::revert(data.clone())),
            MockResponse::RevertMessage(message) => {
                Err(TransportError::Revert { data: Bytes::new(), message: message.clone() })
            }
            MockResponse::Gas(_) => Err(unexpected(to)),
        }
    }

    async fn estimate_gas(&self, to: Address, input: Bytes) -> Result<u64> {
        match self.respond(to, input)? {
            MockResponse::Gas(gas) => Ok(*gas),
            MockResponse::Revert(data) => Err(TransportError::revert(data.clone())),
            MockResponse::RevertMessage(message) => {
                Err(TransportError::Revert { data: Bytes::new(), message: message.clone() })
            }
            MockResponse::Return(_) => Err(unexpected(to)),
        }
    }
}
