//! Permit signing.
//!
//! Signs the EIP-712 permit of a token and turns it into an `exec` batch item, so that the
//! approval and the calls relying on it are executed in a single transaction.

use crate::{
    constants::{USE_PERMIT, USE_PERMIT_ALLOWED, USE_PERMIT_PACKED},
    error::{BatchError, PermitError, SdkError},
    transport::ChainTransport,
    types::{
        BatchItem, CallDescriptor, IERC20Permit, Module, NonceAccessor, PermitOptions,
        PermitSignature, PermitStandard, TokenConfig,
    },
};
use alloy::{
    dyn_abi::{DynSolValue, Eip712Domain, TypedData},
    primitives::{Address, B256, U256},
    signers::Signer,
    sol_types::{SolCall, SolStruct, SolValue},
};
use serde::Serialize;
use tracing::{debug, instrument};

mod eip2612 {
    alloy::sol! {
        /// EIP-2612 permit.
        #[derive(Debug, serde::Serialize, serde::Deserialize)]
        struct Permit {
            address owner;
            address spender;
            uint256 value;
            uint256 nonce;
            uint256 deadline;
        }
    }
}

mod allowed {
    alloy::sol! {
        /// DAI-style permit.
        #[derive(Debug, serde::Serialize, serde::Deserialize)]
        struct Permit {
            address holder;
            address spender;
            uint256 nonce;
            uint256 expiry;
            bool allowed;
        }
    }
}

/// A signed permit.
#[derive(Debug, Clone)]
pub struct SignedPermit {
    /// The signature.
    pub signature: PermitSignature,
    /// The nonce the permit was signed with.
    pub nonce: U256,
    /// The signed typed data.
    pub typed_data: TypedData,
}

/// Signs a permit of `token` for the owner `signer`.
///
/// The nonce is read from the token on every call.
#[instrument(skip_all, fields(token = %token.address, spender = %options.spender))]
pub async fn sign_permit<T, S>(
    transport: &T,
    token: &TokenConfig,
    options: &PermitOptions,
    signer: &S,
) -> Result<SignedPermit, SdkError>
where
    T: ChainTransport + ?Sized,
    S: Signer + Send + Sync + ?Sized,
{
    let config = token.permit()?;
    let owner = signer.address();
    let nonce = fetch_nonce(transport, token.address, config.nonce_accessor, owner).await?;
    let domain = config.domain.to_eip712();

    let (digest, typed_data) = match config.standard {
        PermitStandard::Eip2612 | PermitStandard::Eip2612Packed => typed_data(
            &eip2612::Permit {
                owner,
                spender: options.spender,
                value: options.value,
                nonce,
                deadline: U256::from(options.deadline),
            },
            domain,
        )?,
        PermitStandard::Allowed => typed_data(
            &allowed::Permit {
                holder: owner,
                spender: options.spender,
                nonce,
                expiry: U256::from(options.deadline),
                allowed: options.allowed,
            },
            domain,
        )?,
    };

    let signature = signer.sign_hash(&digest).await.map_err(PermitError::from)?;
    debug!(%owner, %nonce, "Signed permit");

    Ok(SignedPermit { signature: signature.into(), nonce, typed_data })
}

/// Returns the signing hash of `payload` together with its typed data.
fn typed_data<P: SolStruct + Serialize>(
    payload: &P,
    domain: Eip712Domain,
) -> Result<(B256, TypedData), SdkError> {
    let digest = payload.eip712_signing_hash(&domain);
    let typed_data = TypedData::from_struct(payload, Some(domain));

    debug_assert_eq!(Ok(digest), typed_data.eip712_signing_hash());

    Ok((typed_data.eip712_signing_hash().map_err(PermitError::from)?, typed_data))
}

async fn fetch_nonce<T: ChainTransport + ?Sized>(
    transport: &T,
    token: Address,
    accessor: NonceAccessor,
    owner: Address,
) -> Result<U256, SdkError> {
    let input = match accessor {
        NonceAccessor::Nonces => IERC20Permit::noncesCall { owner }.abi_encode(),
        NonceAccessor::UnderscoreNonces => IERC20Permit::_noncesCall { owner }.abi_encode(),
    };
    let output = transport.call(token, input.into()).await?;
    Ok(U256::abi_decode(&output).map_err(|err| BatchError::decoding(accessor.method(), err))?)
}

/// Builds the `exec` batch item applying a signed permit.
pub fn permit_batch_item(
    token: Address,
    standard: PermitStandard,
    options: &PermitOptions,
    signed: &SignedPermit,
    allow_error: bool,
) -> BatchItem {
    let PermitSignature { v, r, s, raw } = &signed.signature;
    let token = DynSolValue::Address(token);
    let deadline = DynSolValue::Uint(U256::from(options.deadline), 256);

    let (method, args) = match standard {
        PermitStandard::Eip2612Packed => (
            USE_PERMIT_PACKED,
            vec![
                token,
                DynSolValue::Uint(options.value, 256),
                deadline,
                DynSolValue::Bytes(raw.to_vec()),
            ],
        ),
        PermitStandard::Eip2612 => (
            USE_PERMIT,
            vec![
                token,
                DynSolValue::Uint(options.value, 256),
                deadline,
                DynSolValue::Uint(U256::from(*v), 8),
                DynSolValue::FixedBytes(*r, 32),
                DynSolValue::FixedBytes(*s, 32),
            ],
        ),
        PermitStandard::Allowed => (
            USE_PERMIT_ALLOWED,
            vec![
                token,
                DynSolValue::Uint(signed.nonce, 256),
                deadline,
                DynSolValue::Bool(options.allowed),
                DynSolValue::Uint(U256::from(*v), 8),
                DynSolValue::FixedBytes(*r, 32),
                DynSolValue::FixedBytes(*s, 32),
            ],
        ),
    };

    CallDescriptor::new(Module::Exec, method, args).with_allow_error(allow_error).into()
}
