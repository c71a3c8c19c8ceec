use crate::{
    error::{BatchError, SdkError},
    resolver::ContractResolver,
    transport::ChainTransport,
    types::{BatchItem, BatchItemError, BatchItemResult, EulerBatchItemResponse},
};
use alloy::{dyn_abi::FunctionExt, json_abi::Function};
use tracing::trace;

/// Decodes the responses of a batch against the interfaces of its items.
#[derive(Debug)]
pub struct BatchDecoder<'a, T: ?Sized> {
    resolver: &'a ContractResolver,
    transport: &'a T,
}

impl<'a, T: ChainTransport + ?Sized> BatchDecoder<'a, T> {
    /// Create a new instance of [`BatchDecoder`].
    pub fn new(resolver: &'a ContractResolver, transport: &'a T) -> Self {
        Self { resolver, transport }
    }

    /// Decodes `responses`, which must be in the order of `items`.
    ///
    /// Failed items are reported per item. Unknown contracts or methods abort the whole batch.
    pub async fn decode(
        &self,
        items: &[BatchItem],
        responses: &[EulerBatchItemResponse],
    ) -> Result<Vec<BatchItemResult>, SdkError> {
        if items.len() != responses.len() {
            return Err(BatchError::LengthMismatch { expected: items.len(), got: responses.len() }
                .into());
        }

        let mut results = Vec::with_capacity(items.len());
        for (item, response) in items.iter().zip(responses) {
            // static calls return the raw result of the inner call
            let call = item.descriptor();
            let contract = self.resolver.resolve(&call.target, self.transport).await?;
            let function = contract.interface.function(&call.method, &call.args)?;
            results.push(decode_response(function, response));
        }
        Ok(results)
    }
}

/// Decodes a single batch response against `function`.
pub fn decode_response(function: &Function, response: &EulerBatchItemResponse) -> BatchItemResult {
    if !response.success {
        trace!(method = %function.name, "Batch item failed");
        return BatchItemResult::Failure(BatchItemError::from_payload(
            &response.result,
            "reverted without reason",
        ));
    }

    match function.abi_decode_output(&response.result) {
        Ok(values) => BatchItemResult::Success(values),
        Err(err) => BatchItemResult::Failure(BatchItemError::from_payload(
            &response.result,
            format!("could not decode {}: {err}", function.name),
        )),
    }
}
