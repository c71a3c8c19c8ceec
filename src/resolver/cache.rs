//! Process-scoped caching of contract resolution.
//!
//! Entries are never invalidated: token deployments for an underlying asset are immutable, and
//! token interfaces only depend on the token kind.

use super::ResolvedContract;
use crate::types::TokenKind;
use alloy::primitives::Address;
use dashmap::DashMap;
use tracing::debug;

/// Thread-safe cache of resolved tokens.
#[derive(Debug, Default)]
pub struct ResolverCache {
    /// Token addresses keyed by kind and underlying asset.
    underlying: DashMap<(TokenKind, Address), Address>,
    /// Resolved token contracts keyed by kind and token address.
    tokens: DashMap<(TokenKind, Address), ResolvedContract>,
}

impl ResolverCache {
    /// Create a new, empty, [`ResolverCache`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached token of `kind` for `underlying`.
    pub fn get_underlying(&self, kind: TokenKind, underlying: Address) -> Option<Address> {
        let entry = self.underlying.get(&(kind, underlying))?;
        debug!(%kind, %underlying, token = %entry.value(), "Underlying cache HIT");
        Some(*entry.value())
    }

    /// Cache the token of `kind` for `underlying`.
    pub fn set_underlying(&self, kind: TokenKind, underlying: Address, token: Address) {
        debug!(%kind, %underlying, %token, "Caching underlying token");
        self.underlying.insert((kind, underlying), token);
    }

    /// Returns the cached token contract, building it with `f` on first access.
    pub fn token_or_insert_with(
        &self,
        kind: TokenKind,
        address: Address,
        f: impl FnOnce() -> ResolvedContract,
    ) -> ResolvedContract {
        self.tokens.entry((kind, address)).or_insert_with(f).value().clone()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats { underlying_cache_size: self.underlying.len(), token_cache_size: self.tokens.len() }
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached underlying translations
    pub underlying_cache_size: usize,
    /// Number of cached token contracts
    pub token_cache_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::builtin_token;
    use alloy::primitives::address;
    use std::sync::Arc;

    #[test]
    fn test_underlying_caching() {
        let cache = ResolverCache::new();
        let underlying = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        let e_token = address!("0x1b808f49add4b8c6b5117d9681cf7312fcf0dc1d");

        assert_eq!(cache.get_underlying(TokenKind::EToken, underlying), None);
        cache.set_underlying(TokenKind::EToken, underlying, e_token);
        assert_eq!(cache.get_underlying(TokenKind::EToken, underlying), Some(e_token));
        assert_eq!(cache.get_underlying(TokenKind::DToken, underlying), None);
    }

    #[test]
    fn test_token_built_once() {
        let cache = ResolverCache::new();
        let token = address!("0x1b808f49add4b8c6b5117d9681cf7312fcf0dc1d");

        let first = cache.token_or_insert_with(TokenKind::EToken, token, || ResolvedContract {
            address: token,
            interface: builtin_token(TokenKind::EToken),
        });
        let second = cache.token_or_insert_with(TokenKind::EToken, token, || {
            panic!("token should be cached")
        });

        assert!(Arc::ptr_eq(&first.interface, &second.interface));
        assert_eq!(
            cache.stats(),
            CacheStats { underlying_cache_size: 0, token_cache_size: 1 }
        );
    }
}
