//! SDK constants.

use alloy::primitives::{Address, address};

/// Revert reasons signalling that a batch would leave an account in violation of its liquidity
/// requirements.
pub const LIQUIDITY_CHECK_ERRORS: [&str; 2] =
    ["e/collateral-violation", "e/borrow-isolation-violation"];

/// Validity of a permit signed without an explicit deadline, in seconds.
pub const DEFAULT_PERMIT_DEADLINE: u64 = 3600;

/// Wrapped ether on mainnet, the reference asset of the mainnet deployment.
pub const WETH_MAINNET: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

/// Wrapped ether on ropsten, the reference asset of the ropsten deployment.
pub const WETH_ROPSTEN: Address = address!("0xc778417e063141139fce010982780140aa0cd5ab");

/// `exec` method wrapping a read-only probe.
pub const DO_STATIC_CALL: &str = "doStaticCall";

/// `exec` method applying an EIP-2612 permit.
pub const USE_PERMIT: &str = "usePermit";

/// `exec` method applying an EIP-2612 permit with a packed signature.
pub const USE_PERMIT_PACKED: &str = "usePermitPacked";

/// `exec` method applying a DAI-style permit.
pub const USE_PERMIT_ALLOWED: &str = "usePermitAllowed";
