//! On-chain interfaces the SDK talks to directly.

use alloy::sol;

sol! {
    /// A single entry of a batch dispatch.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct EulerBatchItem {
        /// Whether a failure of this item is tolerated.
        bool allowError;
        /// The module or token proxy to call.
        address proxyAddr;
        /// Encoded function call data.
        bytes data;
    }

    /// The outcome of a single batch entry.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct EulerBatchItemResponse {
        /// Whether the call succeeded.
        bool success;
        /// Return data, or revert data if the call failed.
        bytes result;
    }

    /// The execution module.
    #[derive(Debug)]
    interface IExec {
        /// Thrown by `batchDispatchSimulate` with the per-item execution trace.
        error BatchDispatchSimulation(EulerBatchItemResponse[] simulation);

        /// Executes a batch of calls, deferring liquidity checks of the given accounts until the
        /// end of the batch.
        function batchDispatch(EulerBatchItem[] calldata items, address[] calldata deferredLiquidityChecks)
            external
            returns (EulerBatchItemResponse[] memory);

        /// Executes a batch of calls and always reverts with `BatchDispatchSimulation`.
        function batchDispatchSimulate(EulerBatchItem[] calldata items, address[] calldata deferredLiquidityChecks)
            external;

        /// Performs a static call and returns its raw result.
        function doStaticCall(address contractAddress, bytes memory payload)
            external
            view
            returns (bytes memory);

        /// Applies an EIP-2612 permit.
        function usePermit(address token, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s)
            external;

        /// Applies a DAI-style permit.
        function usePermitAllowed(address token, uint256 nonce, uint256 expiry, bool allowed, uint8 v, bytes32 r, bytes32 s)
            external;

        /// Applies an EIP-2612 permit taking a packed signature.
        function usePermitPacked(address token, uint256 value, uint256 deadline, bytes calldata signature)
            external;
    }

    /// Underlying to token lookups of the markets module.
    #[derive(Debug)]
    interface IMarkets {
        function underlyingToEToken(address underlying) external view returns (address);
        function underlyingToDToken(address underlying) external view returns (address);
        function underlyingToPToken(address underlying) external view returns (address);
    }

    /// Nonce accessors of permit-enabled tokens.
    #[derive(Debug)]
    interface IERC20Permit {
        function nonces(address owner) external view returns (uint256);
        function _nonces(address owner) external view returns (uint256);
    }
}
