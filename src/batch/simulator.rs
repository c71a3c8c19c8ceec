use super::{BatchCompiler, BatchDecoder};
use crate::{
    constants::LIQUIDITY_CHECK_ERRORS,
    error::{BatchError, SdkError},
    resolver::ContractResolver,
    transport::ChainTransport,
    types::{BatchItem, BatchItemResult, IExec},
};
use alloy::{primitives::Address, sol_types::SolError};
use tracing::{debug, instrument, warn};

/// Outcome of a simulated batch.
///
/// Both the dry run and the gas estimate always run to completion, each failure is reported in
/// its own field.
#[derive(Debug)]
pub struct BatchSimulation {
    /// The decoded results of the dry run.
    pub simulation: Result<Vec<BatchItemResult>, SdkError>,
    /// The gas estimate of the batch.
    pub gas: Result<u64, GasEstimateError>,
}

/// Error returned while estimating the gas of a batch.
#[derive(Debug, thiserror::Error)]
pub enum GasEstimateError {
    /// The batch would violate an account's liquidity requirements.
    #[error("liquidity check failed: {reason}")]
    LiquidityCheck {
        /// The violated requirement.
        violation: &'static str,
        /// The full revert reason.
        reason: String,
    },
    /// Any other failure.
    #[error(transparent)]
    Other(SdkError),
}

impl GasEstimateError {
    /// Classifies an estimation failure.
    pub fn classify(err: SdkError) -> Self {
        if let Some(reason) = err.revert_reason()
            && let Some(violation) =
                LIQUIDITY_CHECK_ERRORS.into_iter().find(|violation| reason.contains(*violation))
        {
            return Self::LiquidityCheck { violation, reason };
        }
        Self::Other(err)
    }

    /// Whether this is a liquidity violation.
    pub const fn is_liquidity_check(&self) -> bool {
        matches!(self, Self::LiquidityCheck { .. })
    }
}

/// Dry-runs batches and estimates their gas.
#[derive(Debug)]
pub struct BatchSimulator<'a, T: ?Sized> {
    resolver: &'a ContractResolver,
    transport: &'a T,
    exclude_static_calls: bool,
}

impl<'a, T: ChainTransport + ?Sized> BatchSimulator<'a, T> {
    /// Create a new instance of [`BatchSimulator`].
    pub fn new(resolver: &'a ContractResolver, transport: &'a T) -> Self {
        Self { resolver, transport, exclude_static_calls: false }
    }

    /// Whether to drop static calls from the gas estimation batch.
    pub fn exclude_static_calls(mut self, exclude: bool) -> Self {
        self.exclude_static_calls = exclude;
        self
    }

    /// Simulates `items` and estimates the gas of `estimate_items`, defaulting to `items`.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn simulate(
        &self,
        deferred_liquidity_checks: &[Address],
        items: &[BatchItem],
        estimate_items: Option<&[BatchItem]>,
    ) -> BatchSimulation {
        let estimate_items: Vec<BatchItem> = estimate_items
            .unwrap_or(items)
            .iter()
            .filter(|item| !(self.exclude_static_calls && item.is_static_call()))
            .cloned()
            .collect();

        let (simulation, gas) = tokio::join!(
            self.dry_run(deferred_liquidity_checks, items),
            self.estimate_gas(deferred_liquidity_checks, &estimate_items)
        );

        if let Err(err) = &gas {
            debug!(%err, "Batch gas estimation failed");
        }
        BatchSimulation { simulation, gas }
    }

    /// Runs `batchDispatchSimulate` and decodes the trace it reverts with.
    async fn dry_run(
        &self,
        deferred_liquidity_checks: &[Address],
        items: &[BatchItem],
    ) -> Result<Vec<BatchItemResult>, SdkError> {
        let request = BatchCompiler::new(self.resolver, self.transport)
            .simulate_request(items, deferred_liquidity_checks)
            .await?;

        let err = match self.transport.call(request.to, request.input).await {
            Ok(output) => {
                warn!(?output, "Batch simulation did not revert");
                return Err(BatchError::UnexpectedSimulation(output).into());
            }
            Err(err) => err,
        };

        let Some(simulation) = err
            .revert_data()
            .and_then(|data| IExec::BatchDispatchSimulation::abi_decode(data).ok())
        else {
            return Err(err.into());
        };

        BatchDecoder::new(self.resolver, self.transport).decode(items, &simulation.simulation).await
    }

    async fn estimate_gas(
        &self,
        deferred_liquidity_checks: &[Address],
        items: &[BatchItem],
    ) -> Result<u64, GasEstimateError> {
        let request = BatchCompiler::new(self.resolver, self.transport)
            .dispatch_request(items, deferred_liquidity_checks)
            .await
            .map_err(GasEstimateError::Other)?;

        self.transport
            .estimate_gas(request.to, request.input)
            .await
            .map_err(|err| GasEstimateError::classify(err.into()))
    }
}
