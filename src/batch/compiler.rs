use crate::{
    constants::DO_STATIC_CALL,
    error::SdkError,
    resolver::ContractResolver,
    transport::ChainTransport,
    types::{BatchItem, CallDescriptor, DispatchRequest, IExec, Module, WireDispatchEntry},
};
use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes},
    sol_types::SolCall,
};
use tracing::{debug, trace};

/// Compiles batch items into wire entries.
#[derive(Debug)]
pub struct BatchCompiler<'a, T: ?Sized> {
    resolver: &'a ContractResolver,
    transport: &'a T,
}

impl<'a, T: ChainTransport + ?Sized> BatchCompiler<'a, T> {
    /// Create a new instance of [`BatchCompiler`].
    pub fn new(resolver: &'a ContractResolver, transport: &'a T) -> Self {
        Self { resolver, transport }
    }

    /// Expands an item into the call that is actually dispatched.
    ///
    /// Static calls become `exec.doStaticCall(target, payload)` of the inner call and keep its
    /// error tolerance.
    pub async fn normalize(&self, item: &BatchItem) -> Result<CallDescriptor, SdkError> {
        match item {
            BatchItem::Call(call) => Ok(call.clone()),
            BatchItem::StaticCall(inner) => {
                let (target, payload) = self.encode(inner).await?;
                trace!(%target, method = %inner.method, "Wrapping static call");
                Ok(CallDescriptor::new(
                    Module::Exec,
                    DO_STATIC_CALL,
                    vec![DynSolValue::Address(target), DynSolValue::Bytes(payload.to_vec())],
                )
                .with_allow_error(inner.allow_error))
            }
        }
    }

    /// Resolves the target of `call` and encodes it.
    pub async fn encode(&self, call: &CallDescriptor) -> Result<(Address, Bytes), SdkError> {
        let contract = self.resolver.resolve(&call.target, self.transport).await?;
        let payload = contract.interface.encode_call(&call.method, &call.args)?;
        Ok((contract.address, payload))
    }

    /// Compiles `items` in order.
    pub async fn compile(&self, items: &[BatchItem]) -> Result<Vec<WireDispatchEntry>, SdkError> {
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let call = self.normalize(item).await?;
            let (target, payload) = self.encode(&call).await?;
            entries.push(WireDispatchEntry { allow_error: call.allow_error, target, payload });
        }
        debug!(items = entries.len(), "Compiled batch");
        Ok(entries)
    }

    /// Builds the `exec.batchDispatch` call of `items`.
    pub async fn dispatch_request(
        &self,
        items: &[BatchItem],
        deferred_liquidity_checks: &[Address],
    ) -> Result<DispatchRequest, SdkError> {
        let entries = self.compile(items).await?;
        let input = IExec::batchDispatchCall {
            items: entries.into_iter().map(Into::into).collect(),
            deferredLiquidityChecks: deferred_liquidity_checks.to_vec(),
        }
        .abi_encode();
        Ok(DispatchRequest { to: self.resolver.module(Module::Exec)?.address, input: input.into() })
    }

    /// Builds the `exec.batchDispatchSimulate` call of `items`.
    pub async fn simulate_request(
        &self,
        items: &[BatchItem],
        deferred_liquidity_checks: &[Address],
    ) -> Result<DispatchRequest, SdkError> {
        let entries = self.compile(items).await?;
        let input = IExec::batchDispatchSimulateCall {
            items: entries.into_iter().map(Into::into).collect(),
            deferredLiquidityChecks: deferred_liquidity_checks.to_vec(),
        }
        .abi_encode();
        Ok(DispatchRequest { to: self.resolver.module(Module::Exec)?.address, input: input.into() })
    }
}
