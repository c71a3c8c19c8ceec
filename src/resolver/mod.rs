//! Contract resolution.
//!
//! Maps logical [`ContractRef`]s to a concrete address paired with the interface used to talk to
//! it. Per-asset tokens referenced by their underlying asset are translated through the markets
//! module once and cached for the lifetime of the resolver.

use crate::{
    abi::{ContractInterface, builtin_token},
    error::{BatchError, ResolverError, SdkError},
    transport::ChainTransport,
    types::{ContractRef, IMarkets, Module, TokenKind, TokenRef, uncapitalize},
};
use alloy::{
    primitives::Address,
    sol_types::{SolCall, SolValue},
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, instrument};

mod cache;
pub use cache::{CacheStats, ResolverCache};

/// A callable contract.
#[derive(Debug, Clone)]
pub struct ResolvedContract {
    /// Address of the contract.
    pub address: Address,
    /// Interface used to encode calls and decode results.
    pub interface: Arc<ContractInterface>,
}

/// Resolves logical contract references.
#[derive(Debug, Clone, Default)]
pub struct ContractResolver {
    /// Singletons keyed by name.
    contracts: HashMap<String, ResolvedContract>,
    /// Interface overrides of token kinds.
    token_interfaces: HashMap<TokenKind, Arc<ContractInterface>>,
    cache: Arc<ResolverCache>,
}

impl ContractResolver {
    /// Create a new, empty, [`ContractResolver`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache shared by this resolver.
    pub fn with_cache(mut self, cache: Arc<ResolverCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Returns the resolver cache.
    pub fn cache(&self) -> &Arc<ResolverCache> {
        &self.cache
    }

    /// Registers a singleton contract, replacing any previous one with the same name.
    ///
    /// Names are stored with a lowercase first character, so `SwapHub` is found as `swapHub`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        address: Address,
        interface: Arc<ContractInterface>,
    ) {
        let name = uncapitalize(&name.into());
        debug!(%name, %address, "Registering contract");
        self.contracts.insert(name, ResolvedContract { address, interface });
    }

    /// Registers a singleton contract by its string address.
    pub fn add_contract(
        &mut self,
        name: impl Into<String>,
        address: &str,
        interface: Arc<ContractInterface>,
    ) -> Result<(), ResolverError> {
        let address = validate_address(address)?;
        self.register(name, address, interface);
        Ok(())
    }

    /// Replaces the interface used for tokens of `kind`.
    ///
    /// Tokens already resolved keep their interface.
    pub fn set_token_interface(&mut self, kind: TokenKind, interface: Arc<ContractInterface>) {
        self.token_interfaces.insert(kind, interface);
    }

    /// Returns a registered module.
    pub fn module(&self, module: Module) -> Result<&ResolvedContract, ResolverError> {
        self.named(module.name())
    }

    /// Returns a registered singleton.
    pub fn named(&self, name: &str) -> Result<&ResolvedContract, ResolverError> {
        self.contracts.get(name).ok_or_else(|| ResolverError::UnknownContract(name.to_string()))
    }

    /// Returns the token of `kind` at `address`.
    ///
    /// The same instance is returned for repeated lookups.
    pub fn token(&self, kind: TokenKind, address: Address) -> ResolvedContract {
        self.cache.token_or_insert_with(kind, address, || ResolvedContract {
            address,
            interface: self.token_interface(kind),
        })
    }

    fn token_interface(&self, kind: TokenKind) -> Arc<ContractInterface> {
        self.token_interfaces.get(&kind).cloned().unwrap_or_else(|| builtin_token(kind))
    }

    /// Resolves a contract reference.
    pub async fn resolve<T: ChainTransport + ?Sized>(
        &self,
        target: &ContractRef,
        transport: &T,
    ) -> Result<ResolvedContract, SdkError> {
        match target {
            ContractRef::Module(module) => Ok(self.module(*module)?.clone()),
            ContractRef::Named(name) => Ok(self.named(name)?.clone()),
            ContractRef::Token { kind, token: TokenRef::Address(address) } => {
                Ok(self.token(*kind, *address))
            }
            ContractRef::Token { kind, token: TokenRef::Underlying(underlying) } => {
                let address = self.token_for_underlying(*kind, *underlying, transport).await?;
                Ok(self.token(*kind, address))
            }
            ContractRef::At { address, interface } => {
                Ok(ResolvedContract { address: *address, interface: Arc::clone(interface) })
            }
        }
    }

    /// Returns the token of `kind` deployed for `underlying`.
    ///
    /// The underlying asset is its own ERC-20. Other kinds are looked up on the markets module
    /// once; lookups that fail are not cached.
    #[instrument(skip(self, transport))]
    pub async fn token_for_underlying<T: ChainTransport + ?Sized>(
        &self,
        kind: TokenKind,
        underlying: Address,
        transport: &T,
    ) -> Result<Address, SdkError> {
        let (method, input) = match kind {
            TokenKind::Erc20 => return Ok(underlying),
            TokenKind::EToken => (
                IMarkets::underlyingToETokenCall::SIGNATURE,
                IMarkets::underlyingToETokenCall { underlying }.abi_encode(),
            ),
            TokenKind::DToken => (
                IMarkets::underlyingToDTokenCall::SIGNATURE,
                IMarkets::underlyingToDTokenCall { underlying }.abi_encode(),
            ),
            TokenKind::PToken => (
                IMarkets::underlyingToPTokenCall::SIGNATURE,
                IMarkets::underlyingToPTokenCall { underlying }.abi_encode(),
            ),
        };

        if let Some(token) = self.cache.get_underlying(kind, underlying) {
            return Ok(token);
        }

        let markets = self.module(Module::Markets)?.address;
        let output = transport.call(markets, input.into()).await?;
        let token =
            Address::abi_decode(&output).map_err(|err| BatchError::decoding(method, err))?;
        if token.is_zero() {
            return Err(ResolverError::NoTokenForUnderlying { kind, underlying }.into());
        }

        self.cache.set_underlying(kind, underlying, token);
        Ok(token)
    }
}

/// Parses a hex address.
///
/// Mixed-case addresses must carry a valid EIP-55 checksum.
pub fn validate_address(address: &str) -> Result<Address, ResolverError> {
    let invalid = || ResolverError::InvalidAddress(address.to_string());

    let hex = address
        .strip_prefix("0x")
        .filter(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(invalid)?;

    let mixed_case =
        hex.bytes().any(|b| b.is_ascii_uppercase()) && hex.bytes().any(|b| b.is_ascii_lowercase());
    if mixed_case {
        Address::parse_checksummed(address, None).map_err(|_| invalid())
    } else {
        address.parse().map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{MARKETS, MockResponse, MockTransport, test_resolver},
        transport::TransportError,
    };
    use alloy::primitives::address;

    const WETH: Address = address!("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    const E_WETH: Address = address!("0x1b808f49add4b8c6b5117d9681cf7312fcf0dc1d");

    #[test]
    fn validates_addresses() {
        assert_eq!(validate_address("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"), Ok(WETH));
        assert_eq!(validate_address("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), Ok(WETH));

        for invalid in [
            "",
            "0x",
            "c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc",
            "0xz02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            // bad checksum
            "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756CC2",
        ] {
            assert!(
                matches!(validate_address(invalid), Err(ResolverError::InvalidAddress(_))),
                "{invalid}"
            );
        }
    }

    #[test]
    fn unknown_contract() {
        let resolver = ContractResolver::new();
        assert!(matches!(
            resolver.module(Module::Exec),
            Err(ResolverError::UnknownContract(name)) if name == "exec"
        ));
    }

    #[tokio::test]
    async fn registers_uncapitalized_names() {
        let mut resolver = test_resolver();
        resolver
            .add_contract(
                "SwapHub",
                "0x7123c8cbbd76c5c7fcc9f7150f23179bec0ba341",
                builtin_token(TokenKind::Erc20),
            )
            .unwrap();

        let resolved =
            resolver.resolve(&ContractRef::named("swapHub"), &MockTransport::new()).await.unwrap();
        assert_eq!(resolved.address, address!("0x7123c8cbbd76c5c7fcc9f7150f23179bec0ba341"));
        assert!(resolver.named("SwapHub").is_err());
    }

    #[tokio::test]
    async fn caches_underlying_lookup() {
        let transport = MockTransport::new().on_call(
            MARKETS,
            IMarkets::underlyingToETokenCall::SELECTOR,
            MockResponse::Return(E_WETH.abi_encode().into()),
        );
        let resolver = test_resolver();
        let target = ContractRef::token_of(TokenKind::EToken, WETH);

        let first = resolver.resolve(&target, &transport).await.unwrap();
        let second = resolver.resolve(&target, &transport).await.unwrap();

        assert_eq!(first.address, E_WETH);
        assert!(Arc::ptr_eq(&first.interface, &second.interface));
        assert_eq!(transport.call_count(MARKETS, IMarkets::underlyingToETokenCall::SELECTOR), 1);

        // the underlying asset is its own erc20
        let erc20 =
            resolver.resolve(&ContractRef::token_of(TokenKind::Erc20, WETH), &transport).await;
        assert_eq!(erc20.unwrap().address, WETH);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn failed_lookups_are_not_cached() {
        let transport = MockTransport::new().on_call(
            MARKETS,
            IMarkets::underlyingToDTokenCall::SELECTOR,
            MockResponse::Return(Address::ZERO.abi_encode().into()),
        );
        let resolver = test_resolver();

        for _ in 0..2 {
            let err = resolver
                .token_for_underlying(TokenKind::DToken, WETH, &transport)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                SdkError::Resolver(ResolverError::NoTokenForUnderlying {
                    kind: TokenKind::DToken,
                    ..
                })
            ));
        }
        assert_eq!(transport.call_count(MARKETS, IMarkets::underlyingToDTokenCall::SELECTOR), 2);

        let transport = MockTransport::new().on_call(
            MARKETS,
            IMarkets::underlyingToPTokenCall::SELECTOR,
            MockResponse::RevertMessage("execution reverted".to_string()),
        );
        let err = resolver.token_for_underlying(TokenKind::PToken, WETH, &transport).await;
        assert!(matches!(err, Err(SdkError::Transport(TransportError::Revert { .. }))));
        assert_eq!(resolver.cache().stats().underlying_cache_size, 0);
    }
}
