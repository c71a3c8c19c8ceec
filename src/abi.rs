//! Contract interfaces.
//!
//! Every logical contract is paired with a [`ContractInterface`], a thin wrapper over an alloy
//! [`JsonAbi`] used to encode calls and decode their return data at runtime. Built-in
//! human-readable interfaces cover the methods this crate relies on; complete ABIs can be
//! supplied through the network configuration.

use crate::{
    error::BatchError,
    types::{Module, TokenKind},
};
use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    json_abi::{Function, JsonAbi},
    primitives::Bytes,
};
use std::sync::{Arc, LazyLock};

/// An encoding schema for a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInterface {
    abi: JsonAbi,
}

impl ContractInterface {
    /// Create a new instance of [`ContractInterface`].
    pub fn new(abi: JsonAbi) -> Self {
        Self { abi }
    }

    /// Parses a JSON ABI.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::new)
    }

    /// Parses human-readable signatures, e.g. `function balanceOf(address) view returns (uint256)`.
    pub fn from_signatures<'a>(signatures: impl IntoIterator<Item = &'a str>) -> eyre::Result<Self> {
        JsonAbi::parse(signatures).map(Self::new).map_err(|err| eyre::eyre!("invalid abi: {err}"))
    }

    /// Returns the inner [`JsonAbi`].
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Returns the overload of `method` accepting `args`.
    pub fn function(&self, method: &str, args: &[DynSolValue]) -> Result<&Function, BatchError> {
        self.select(method, args).map(|(function, _)| function)
    }

    /// Encodes a call to `method` with `args`, selector included.
    pub fn encode_call(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes, BatchError> {
        self.select(method, args).map(|(_, payload)| payload)
    }

    /// Decodes the return data of `method` called with `args`.
    pub fn decode_result(
        &self,
        method: &str,
        args: &[DynSolValue],
        data: &[u8],
    ) -> Result<Vec<DynSolValue>, BatchError> {
        self.function(method, args)?
            .abi_decode_output(data)
            .map_err(|err| BatchError::decoding(method, err))
    }

    /// Overloads are matched on arity first, then on whether the arguments type-check.
    fn select(&self, method: &str, args: &[DynSolValue]) -> Result<(&Function, Bytes), BatchError> {
        let overloads =
            self.abi.function(method).ok_or_else(|| BatchError::encoding(method, "unknown method"))?;

        let mut last_error = None;
        for function in overloads.iter().filter(|function| function.inputs.len() == args.len()) {
            match function.abi_encode_input(args) {
                Ok(payload) => return Ok((function, payload.into())),
                Err(err) => last_error = Some(err.to_string()),
            }
        }

        Err(BatchError::encoding(
            method,
            last_error.unwrap_or_else(|| format!("no overload takes {} arguments", args.len())),
        ))
    }
}

const ERC20: &[&str] = &[
    "event Approval(address indexed owner, address indexed spender, uint256 value)",
    "event Transfer(address indexed from, address indexed to, uint256 value)",
    "function name() view returns (string)",
    "function symbol() view returns (string)",
    "function decimals() view returns (uint8)",
    "function totalSupply() view returns (uint256)",
    "function balanceOf(address owner) view returns (uint256)",
    "function allowance(address owner, address spender) view returns (uint256)",
    "function approve(address spender, uint256 value) returns (bool)",
    "function transfer(address to, uint256 value) returns (bool)",
    "function transferFrom(address from, address to, uint256 value) returns (bool)",
];

const EULER: &[&str] = &[
    "function moduleIdToImplementation(uint256 moduleId) view returns (address)",
    "function moduleIdToProxy(uint256 moduleId) view returns (address)",
    "function getUpgradeAdmin() view returns (address)",
    "function getGovernorAdmin() view returns (address)",
];

const EXEC: &[&str] = &[
    "error BatchDispatchSimulation((bool,bytes)[] simulation)",
    "function batchDispatch((bool,address,bytes)[] items, address[] deferredLiquidityChecks) returns ((bool,bytes)[])",
    "function batchDispatchSimulate((bool,address,bytes)[] items, address[] deferredLiquidityChecks)",
    "function doStaticCall(address contractAddress, bytes payload) view returns (bytes)",
    "function usePermit(address token, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s)",
    "function usePermitAllowed(address token, uint256 nonce, uint256 expiry, bool allowed, uint8 v, bytes32 r, bytes32 s)",
    "function usePermitPacked(address token, uint256 value, uint256 deadline, bytes signature)",
    "function getPrice(address underlying) view returns (uint256 twap, uint256 twapPeriod)",
    "function getPriceFull(address underlying) view returns (uint256 twap, uint256 twapPeriod, uint256 currPrice)",
    "function pTokenWrap(address underlying, uint256 amount)",
    "function pTokenUnWrap(address underlying, uint256 amount)",
    "function trackAverageLiquidity(uint256 subAccountId, address delegate, bool onlyDelegate)",
    "function unTrackAverageLiquidity(uint256 subAccountId)",
    "function getAverageLiquidity(address account) view returns (uint256)",
];

const LIQUIDATION: &[&str] = &[
    "function checkLiquidation(address liquidator, address violator, address underlying, address collateral) returns ((uint256,uint256,uint256,uint256,uint256,uint256) liqOpp)",
    "function liquidate(address violator, address underlying, address collateral, uint256 repay, uint256 minYield)",
];

const MARKETS: &[&str] = &[
    "function activateMarket(address underlying) returns (address)",
    "function activatePToken(address underlying) returns (address)",
    "function underlyingToEToken(address underlying) view returns (address)",
    "function underlyingToDToken(address underlying) view returns (address)",
    "function underlyingToPToken(address underlying) view returns (address)",
    "function eTokenToUnderlying(address eToken) view returns (address underlying)",
    "function dTokenToUnderlying(address dToken) view returns (address underlying)",
    "function interestRate(address underlying) view returns (int96)",
    "function getEnteredMarkets(address account) view returns (address[])",
    "function enterMarket(uint256 subAccountId, address newMarket)",
    "function exitMarket(uint256 subAccountId, address oldMarket)",
];

const SWAP: &[&str] = &[
    "function swapUniExactInputSingle((uint256,uint256,address,address,uint256,uint256,uint256,uint24,uint160) params)",
    "function swapUniExactOutputSingle((uint256,uint256,address,address,uint256,uint256,uint256,uint24,uint160) params)",
];

const E_TOKEN: &[&str] = &[
    "function underlyingAsset() view returns (address)",
    "function balanceOfUnderlying(address account) view returns (uint256)",
    "function totalSupplyUnderlying() view returns (uint256)",
    "function convertBalanceToUnderlying(uint256 balance) view returns (uint256)",
    "function convertUnderlyingToBalance(uint256 underlyingAmount) view returns (uint256)",
    "function deposit(uint256 subAccountId, uint256 amount)",
    "function withdraw(uint256 subAccountId, uint256 amount)",
    "function mint(uint256 subAccountId, uint256 amount)",
    "function burn(uint256 subAccountId, uint256 amount)",
    "function approveSubAccount(uint256 subAccountId, address spender, uint256 amount) returns (bool)",
];

const D_TOKEN: &[&str] = &[
    "function underlyingAsset() view returns (address)",
    "function borrow(uint256 subAccountId, uint256 amount)",
    "function repay(uint256 subAccountId, uint256 amount)",
    "function approveDebt(uint256 subAccountId, address spender, uint256 amount) returns (bool)",
    "function debtAllowance(address holder, address spender) view returns (uint256)",
];

const P_TOKEN: &[&str] = &[
    "function underlying() view returns (address)",
    "function wrap(uint256 amount)",
    "function unwrap(uint256 amount)",
    "function claimSurplus(address who)",
];

fn parse_builtin(parts: &[&[&str]]) -> Arc<ContractInterface> {
    let interface = ContractInterface::from_signatures(parts.iter().flat_map(|part| part.iter().copied()))
        .expect("built-in interfaces are valid");
    Arc::new(interface)
}

static ERC20_INTERFACE: LazyLock<Arc<ContractInterface>> = LazyLock::new(|| parse_builtin(&[ERC20]));
static EULER_INTERFACE: LazyLock<Arc<ContractInterface>> = LazyLock::new(|| parse_builtin(&[EULER]));
static EXEC_INTERFACE: LazyLock<Arc<ContractInterface>> = LazyLock::new(|| parse_builtin(&[EXEC]));
static LIQUIDATION_INTERFACE: LazyLock<Arc<ContractInterface>> =
    LazyLock::new(|| parse_builtin(&[LIQUIDATION]));
static MARKETS_INTERFACE: LazyLock<Arc<ContractInterface>> =
    LazyLock::new(|| parse_builtin(&[MARKETS]));
static SWAP_INTERFACE: LazyLock<Arc<ContractInterface>> = LazyLock::new(|| parse_builtin(&[SWAP]));
static E_TOKEN_INTERFACE: LazyLock<Arc<ContractInterface>> =
    LazyLock::new(|| parse_builtin(&[ERC20, E_TOKEN]));
static D_TOKEN_INTERFACE: LazyLock<Arc<ContractInterface>> =
    LazyLock::new(|| parse_builtin(&[ERC20, D_TOKEN]));
static P_TOKEN_INTERFACE: LazyLock<Arc<ContractInterface>> =
    LazyLock::new(|| parse_builtin(&[ERC20, P_TOKEN]));

/// Returns the built-in interface of a module, if there is one.
///
/// Mining and view contracts have no built-in interface and must be configured.
pub fn builtin_module(module: Module) -> Option<Arc<ContractInterface>> {
    let interface = match module {
        Module::Euler => &EULER_INTERFACE,
        Module::Exec => &EXEC_INTERFACE,
        Module::Liquidation => &LIQUIDATION_INTERFACE,
        Module::Markets => &MARKETS_INTERFACE,
        Module::Swap => &SWAP_INTERFACE,
        Module::Eul => &ERC20_INTERFACE,
        Module::EulStakes | Module::EulDistributor | Module::EulerGeneralView => return None,
    };
    Some(Arc::clone(interface))
}

/// Returns the built-in interface of a token kind.
pub fn builtin_token(kind: TokenKind) -> Arc<ContractInterface> {
    let interface = match kind {
        TokenKind::Erc20 => &ERC20_INTERFACE,
        TokenKind::EToken => &E_TOKEN_INTERFACE,
        TokenKind::DToken => &D_TOKEN_INTERFACE,
        TokenKind::PToken => &P_TOKEN_INTERFACE,
    };
    Arc::clone(interface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{U256, address};

    #[test]
    fn builtins_parse() {
        for module in [Module::Euler, Module::Exec, Module::Liquidation, Module::Markets, Module::Swap]
        {
            assert!(builtin_module(module).is_some(), "{module}");
        }
        assert!(builtin_module(Module::EulStakes).is_none());

        let exec = builtin_module(Module::Exec).unwrap();
        assert!(exec.abi().error("BatchDispatchSimulation").is_some());
    }

    #[test]
    fn encodes_with_selector() {
        let e_token = builtin_token(TokenKind::EToken);
        let payload = e_token
            .encode_call(
                "deposit",
                &[DynSolValue::Uint(U256::ZERO, 256), DynSolValue::Uint(U256::from(100), 256)],
            )
            .unwrap();

        let function = e_token.function(
            "deposit",
            &[DynSolValue::Uint(U256::ZERO, 256), DynSolValue::Uint(U256::from(100), 256)],
        );
        assert_eq!(&payload[..4], function.unwrap().selector().as_slice());
        assert_eq!(payload.len(), 4 + 64);
    }

    #[test]
    fn parses_json_abi() {
        let interface = ContractInterface::from_json(
            r#"[{"type":"function","name":"totalSupply","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"}]"#,
        )
        .unwrap();
        let payload = interface.encode_call("totalSupply", &[]).unwrap();
        assert_eq!(payload, builtin_token(TokenKind::Erc20).encode_call("totalSupply", &[]).unwrap());

        assert!(ContractInterface::from_json("{").is_err());
    }

    #[test]
    fn decodes_result() {
        let erc20 = builtin_token(TokenKind::Erc20);
        let args = [DynSolValue::Address(address!("0x0000000000000000000000000000000000000001"))];
        let data = U256::from(42).to_be_bytes::<32>();

        let values = erc20.decode_result("balanceOf", &args, &data).unwrap();
        assert_eq!(values, vec![DynSolValue::Uint(U256::from(42), 256)]);

        assert!(matches!(
            erc20.decode_result("balanceOf", &args, &[0xde, 0xad]),
            Err(BatchError::Decoding { .. })
        ));
    }

    #[test]
    fn rejects_unknown_method_and_bad_args() {
        let erc20 = builtin_token(TokenKind::Erc20);
        let owner = address!("0x0000000000000000000000000000000000000001");

        assert!(matches!(
            erc20.encode_call("mint", &[]),
            Err(BatchError::Encoding { method, .. }) if method == "mint"
        ));
        // arity mismatch
        assert!(erc20.encode_call("balanceOf", &[]).is_err());
        // type mismatch
        assert!(erc20.encode_call("balanceOf", &[DynSolValue::Bool(true)]).is_err());
        assert!(erc20.encode_call("balanceOf", &[DynSolValue::Address(owner)]).is_ok());
    }
}
