//! Call descriptors and contract references.

use crate::{abi::ContractInterface, error::ResolverError, resolver::validate_address};
use alloy::{dyn_abi::DynSolValue, primitives::Address};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};

/// A singleton protocol contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Module {
    /// The core contract holding protocol state.
    Euler,
    /// The execution module, entry point of batches.
    Exec,
    /// The liquidation module.
    Liquidation,
    /// The markets module.
    Markets,
    /// The swap module.
    Swap,
    /// The EUL token.
    Eul,
    /// EUL staking.
    EulStakes,
    /// EUL reward distribution.
    EulDistributor,
    /// Read-only aggregate view of the protocol.
    EulerGeneralView,
}

impl Module {
    /// All modules.
    pub const ALL: [Self; 9] = [
        Self::Euler,
        Self::Exec,
        Self::Liquidation,
        Self::Markets,
        Self::Swap,
        Self::Eul,
        Self::EulStakes,
        Self::EulDistributor,
        Self::EulerGeneralView,
    ];

    /// Returns the name used in address files.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Euler => "euler",
            Self::Exec => "exec",
            Self::Liquidation => "liquidation",
            Self::Markets => "markets",
            Self::Swap => "swap",
            Self::Eul => "eul",
            Self::EulStakes => "eulStakes",
            Self::EulDistributor => "eulDistributor",
            Self::EulerGeneralView => "eulerGeneralView",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Module {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = uncapitalize(s);
        Self::ALL.into_iter().find(|module| module.name() == name).ok_or(name)
    }
}

/// The kind of a per-asset token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// A plain ERC-20, usually an underlying asset.
    Erc20,
    /// Interest-bearing deposit token.
    EToken,
    /// Debt token.
    DToken,
    /// Protected collateral token.
    PToken,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Erc20 => f.write_str("erc20"),
            Self::EToken => f.write_str("eToken"),
            Self::DToken => f.write_str("dToken"),
            Self::PToken => f.write_str("pToken"),
        }
    }
}

/// Identifies a token instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenRef {
    /// The token contract itself.
    Address(Address),
    /// The underlying asset of the token, translated through the markets module.
    Underlying(Address),
}

impl TokenRef {
    /// Parses a token address.
    pub fn parse(address: &str) -> Result<Self, ResolverError> {
        validate_address(address).map(Self::Address)
    }
}

/// A logical reference to a callable contract.
#[derive(Debug, Clone)]
pub enum ContractRef {
    /// A singleton module.
    Module(Module),
    /// A singleton registered at runtime.
    Named(String),
    /// A per-asset token.
    Token {
        /// Kind of the token.
        kind: TokenKind,
        /// The token or its underlying asset.
        token: TokenRef,
    },
    /// A concrete address with an explicit interface.
    At {
        /// Address of the contract.
        address: Address,
        /// Interface used to encode and decode calls.
        interface: Arc<ContractInterface>,
    },
}

impl ContractRef {
    /// Reference by name. Names of known modules resolve to [`ContractRef::Module`].
    pub fn named(name: &str) -> Self {
        name.parse().map(Self::Module).unwrap_or_else(Self::Named)
    }

    /// An ERC-20 token.
    pub const fn erc20(address: Address) -> Self {
        Self::Token { kind: TokenKind::Erc20, token: TokenRef::Address(address) }
    }

    /// An eToken by address.
    pub const fn e_token(address: Address) -> Self {
        Self::Token { kind: TokenKind::EToken, token: TokenRef::Address(address) }
    }

    /// A dToken by address.
    pub const fn d_token(address: Address) -> Self {
        Self::Token { kind: TokenKind::DToken, token: TokenRef::Address(address) }
    }

    /// A pToken by address.
    pub const fn p_token(address: Address) -> Self {
        Self::Token { kind: TokenKind::PToken, token: TokenRef::Address(address) }
    }

    /// A token of `kind` looked up by its underlying asset.
    pub const fn token_of(kind: TokenKind, underlying: Address) -> Self {
        Self::Token { kind, token: TokenRef::Underlying(underlying) }
    }
}

impl From<Module> for ContractRef {
    fn from(module: Module) -> Self {
        Self::Module(module)
    }
}

impl fmt::Display for ContractRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(module) => module.fmt(f),
            Self::Named(name) => f.write_str(name),
            Self::Token { kind, token: TokenRef::Address(address) } => write!(f, "{kind}({address})"),
            Self::Token { kind, token: TokenRef::Underlying(underlying) } => {
                write!(f, "{kind}(underlying {underlying})")
            }
            Self::At { address, .. } => write!(f, "{address}"),
        }
    }
}

/// One intended invocation.
#[derive(Debug, Clone)]
pub struct CallDescriptor {
    /// The contract to call.
    pub target: ContractRef,
    /// Method name.
    pub method: String,
    /// Method arguments.
    pub args: Vec<DynSolValue>,
    /// Whether the batch tolerates a failure of this call.
    pub allow_error: bool,
}

impl CallDescriptor {
    /// Create a new instance of [`CallDescriptor`], failures not allowed.
    pub fn new(
        target: impl Into<ContractRef>,
        method: impl Into<String>,
        args: Vec<DynSolValue>,
    ) -> Self {
        Self { target: target.into(), method: method.into(), args, allow_error: false }
    }

    /// Sets whether a failure of this call is tolerated.
    pub fn with_allow_error(mut self, allow_error: bool) -> Self {
        self.allow_error = allow_error;
        self
    }

    /// Wraps this call into a static call.
    pub fn into_static_call(self) -> BatchItem {
        BatchItem::StaticCall(self)
    }
}

/// An entry of a batch.
#[derive(Debug, Clone)]
pub enum BatchItem {
    /// A regular call.
    Call(CallDescriptor),
    /// A read-only probe dispatched through `exec.doStaticCall`.
    ///
    /// The failure tolerance of the inner call is used for the wrapper.
    StaticCall(CallDescriptor),
}

impl BatchItem {
    /// Returns the descriptor whose method defines the result of this item.
    pub fn descriptor(&self) -> &CallDescriptor {
        match self {
            Self::Call(call) | Self::StaticCall(call) => call,
        }
    }

    /// Whether this is a static call.
    pub const fn is_static_call(&self) -> bool {
        matches!(self, Self::StaticCall(_))
    }
}

impl From<CallDescriptor> for BatchItem {
    fn from(call: CallDescriptor) -> Self {
        Self::Call(call)
    }
}

/// Lowercases the first character of a contract name.
pub(crate) fn uncapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_names() {
        assert_eq!("Exec".parse::<Module>(), Ok(Module::Exec));
        assert_eq!("eulerGeneralView".parse::<Module>(), Ok(Module::EulerGeneralView));
        assert_eq!("SwapHub".parse::<Module>(), Err("swapHub".to_string()));

        assert!(matches!(ContractRef::named("Markets"), ContractRef::Module(Module::Markets)));
        assert!(matches!(ContractRef::named("swapHub"), ContractRef::Named(name) if name == "swapHub"));
    }

    #[test]
    fn parses_token_refs() {
        assert_eq!(
            TokenRef::parse("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
            Ok(TokenRef::Address(alloy::primitives::address!(
                "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
            )))
        );
        assert!(matches!(TokenRef::parse("0x12"), Err(ResolverError::InvalidAddress(_))));
    }

    #[test]
    fn static_call_exposes_inner_descriptor() {
        let call = CallDescriptor::new(Module::Markets, "getEnteredMarkets", vec![])
            .with_allow_error(true);
        let item = call.into_static_call();

        assert!(item.is_static_call());
        assert_eq!(item.descriptor().method, "getEnteredMarkets");
        assert!(item.descriptor().allow_error);
    }
}
