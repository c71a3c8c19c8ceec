//! Client facade.

use crate::{
    abi::ContractInterface,
    batch::{BatchCompiler, BatchDecoder, BatchSimulation, BatchSimulator},
    config::NetworkConfig,
    constants::DEFAULT_PERMIT_DEADLINE,
    error::{PermitError, Result},
    permit::{SignedPermit, permit_batch_item, sign_permit},
    resolver::{ContractResolver, ResolvedContract},
    transport::ChainTransport,
    types::{
        BatchItem, BatchItemResult, DispatchRequest, EulerBatchItemResponse, Module,
        PermitOptions, TokenConfig, TokenKind, WireDispatchEntry,
    },
};
use alloy::{primitives::Address, signers::Signer};
use std::{
    fmt,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

/// A signer usable by the client.
pub type DynSigner = Arc<dyn Signer + Send + Sync>;

/// Entry point to the protocol on one network.
#[derive(Clone)]
pub struct EulerClient<T> {
    config: NetworkConfig,
    resolver: ContractResolver,
    transport: T,
    signer: Option<DynSigner>,
}

impl<T: fmt::Debug> fmt::Debug for EulerClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EulerClient")
            .field("chain_id", &self.config.chain_id)
            .field("transport", &self.transport)
            .field("signer", &self.signer.as_ref().map(|signer| signer.address()))
            .finish_non_exhaustive()
    }
}

impl<T: ChainTransport> EulerClient<T> {
    /// Create a new instance of [`EulerClient`].
    pub fn new(config: NetworkConfig, transport: T) -> Result<Self> {
        let resolver = config.resolver()?;
        Ok(Self { config, resolver, transport, signer: None })
    }

    /// Switches to another transport, keeping registered contracts and cached tokens.
    pub fn connect<U: ChainTransport>(self, transport: U) -> EulerClient<U> {
        EulerClient {
            config: self.config,
            resolver: self.resolver,
            transport,
            signer: self.signer,
        }
    }

    /// Sets the signer used for permits.
    pub fn with_signer(mut self, signer: DynSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Returns the signer, if any.
    pub fn signer(&self) -> Option<&DynSigner> {
        self.signer.as_ref()
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the network configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Returns the resolver.
    pub fn resolver(&self) -> &ContractResolver {
        &self.resolver
    }

    /// Returns the reference asset of the network.
    pub fn reference_asset(&self) -> Result<Address> {
        Ok(self.config.reference_asset()?)
    }

    /// Returns the EUL token configuration, if the network has one.
    pub fn eul_token(&self) -> Option<&TokenConfig> {
        self.config.eul.as_ref()
    }

    /// Registers an additional singleton contract.
    pub fn add_contract(
        &mut self,
        name: impl Into<String>,
        interface: Arc<ContractInterface>,
        address: &str,
    ) -> Result<()> {
        Ok(self.resolver.add_contract(name, address, interface)?)
    }

    /// Returns a registered module.
    pub fn module(&self, module: Module) -> Result<&ResolvedContract> {
        Ok(self.resolver.module(module)?)
    }

    /// Returns the ERC-20 token at `address`.
    pub fn erc20(&self, address: Address) -> ResolvedContract {
        self.resolver.token(TokenKind::Erc20, address)
    }

    /// Returns the eToken at `address`.
    pub fn e_token(&self, address: Address) -> ResolvedContract {
        self.resolver.token(TokenKind::EToken, address)
    }

    /// Returns the dToken at `address`.
    pub fn d_token(&self, address: Address) -> ResolvedContract {
        self.resolver.token(TokenKind::DToken, address)
    }

    /// Returns the pToken at `address`.
    pub fn p_token(&self, address: Address) -> ResolvedContract {
        self.resolver.token(TokenKind::PToken, address)
    }

    /// Returns the token of `kind` deployed for `underlying`.
    pub async fn token_for_underlying(&self, kind: TokenKind, underlying: Address) -> Result<Address> {
        self.resolver.token_for_underlying(kind, underlying, &self.transport).await
    }

    /// Compiles `items` into wire entries.
    pub async fn build_batch(&self, items: &[BatchItem]) -> Result<Vec<WireDispatchEntry>> {
        BatchCompiler::new(&self.resolver, &self.transport).compile(items).await
    }

    /// Builds the `exec.batchDispatch` call of `items`.
    pub async fn batch_dispatch_request(
        &self,
        items: &[BatchItem],
        deferred_liquidity_checks: &[Address],
    ) -> Result<DispatchRequest> {
        BatchCompiler::new(&self.resolver, &self.transport)
            .dispatch_request(items, deferred_liquidity_checks)
            .await
    }

    /// Decodes the responses of a dispatched batch.
    pub async fn decode_batch(
        &self,
        items: &[BatchItem],
        responses: &[EulerBatchItemResponse],
    ) -> Result<Vec<BatchItemResult>> {
        BatchDecoder::new(&self.resolver, &self.transport).decode(items, responses).await
    }

    /// Dry-runs `items` and estimates their gas concurrently.
    pub async fn simulate_batch(
        &self,
        deferred_liquidity_checks: &[Address],
        items: &[BatchItem],
        estimate_items: Option<&[BatchItem]>,
        exclude_static_calls: bool,
    ) -> BatchSimulation {
        BatchSimulator::new(&self.resolver, &self.transport)
            .exclude_static_calls(exclude_static_calls)
            .simulate(deferred_liquidity_checks, items, estimate_items)
            .await
    }

    /// Default permit options: unlimited approval of the euler module for one hour.
    pub fn default_permit_options(&self) -> Result<PermitOptions> {
        let euler = self.resolver.module(Module::Euler)?.address;
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        Ok(PermitOptions::new(euler, now + DEFAULT_PERMIT_DEADLINE))
    }

    /// Signs a permit of `token` with the connected signer.
    pub async fn sign_permit(
        &self,
        token: &TokenConfig,
        options: &PermitOptions,
    ) -> Result<SignedPermit> {
        let signer = self.signer.as_deref().ok_or(PermitError::MissingSigner)?;
        sign_permit(&self.transport, token, options, signer).await
    }

    /// Signs a permit of `token` and returns the batch item applying it.
    ///
    /// The spender is always the euler module.
    pub async fn sign_permit_batch_item(
        &self,
        token: &TokenConfig,
        options: PermitOptions,
        allow_error: bool,
    ) -> Result<BatchItem> {
        let standard = token.permit()?.standard;
        let options = options.with_spender(self.resolver.module(Module::Euler)?.address);
        let signed = self.sign_permit(token, &options).await?;
        Ok(permit_batch_item(token.address, standard, &options, &signed, allow_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        SdkError,
        test_utils::{EULER, EXEC, MockResponse, MockTransport, TOKEN, test_config},
        types::{IERC20Permit, PermitConfig, PermitDomain, PermitStandard},
    };
    use alloy::{
        primitives::U256,
        signers::local::PrivateKeySigner,
        sol_types::{SolCall, SolValue},
    };

    fn permit_token() -> TokenConfig {
        TokenConfig::new(TOKEN).with_permit(PermitConfig::new(
            PermitStandard::Eip2612,
            PermitDomain { name: Some("Token".to_string()), ..Default::default() },
        ))
    }

    #[test]
    fn connect_keeps_cache() {
        let client = EulerClient::new(test_config(), MockTransport::new()).unwrap();
        let before = client.e_token(TOKEN);

        let client = client.connect(MockTransport::new());
        let after = client.e_token(TOKEN);

        assert!(Arc::ptr_eq(&before.interface, &after.interface));
        assert_eq!(client.resolver().cache().stats().token_cache_size, 1);
        assert_eq!(client.module(Module::Exec).unwrap().address, EXEC);
    }

    #[tokio::test]
    async fn permit_requires_signer() {
        let client = EulerClient::new(test_config(), MockTransport::new()).unwrap();
        let options = client.default_permit_options().unwrap();

        let err = client.sign_permit(&permit_token(), &options).await.unwrap_err();
        assert!(matches!(err, SdkError::Permit(PermitError::MissingSigner)));
    }

    #[tokio::test]
    async fn permit_batch_item_approves_euler() {
        let transport = MockTransport::new().on_call(
            TOKEN,
            IERC20Permit::noncesCall::SELECTOR,
            MockResponse::Return(U256::ZERO.abi_encode().into()),
        );
        let client = EulerClient::new(test_config(), transport)
            .unwrap()
            .with_signer(Arc::new(PrivateKeySigner::random()));

        let options = client.default_permit_options().unwrap().with_spender(TOKEN);
        assert!(options.deadline > DEFAULT_PERMIT_DEADLINE);

        let item = client.sign_permit_batch_item(&permit_token(), options, false).await.unwrap();
        assert_eq!(item.descriptor().method, "usePermit");

        // signatures are deterministic, so the item must carry the signature approving euler
        let signed = client.sign_permit(&permit_token(), &options.with_spender(EULER)).await.unwrap();
        assert_eq!(
            item.descriptor().args[4],
            alloy::dyn_abi::DynSolValue::FixedBytes(signed.signature.r, 32)
        );
    }
}
