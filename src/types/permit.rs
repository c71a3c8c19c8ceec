//! Permit configuration and signature types.

use crate::error::PermitError;
use alloy::{
    dyn_abi::Eip712Domain,
    primitives::{Address, B256, Bytes, Signature, U256},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Off-chain approval scheme implemented by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermitStandard {
    /// EIP-2612 `permit(owner, spender, value, deadline, v, r, s)`.
    Eip2612,
    /// EIP-2612 taking the signature as packed bytes.
    Eip2612Packed,
    /// DAI-style `permit(holder, spender, nonce, expiry, allowed, v, r, s)`.
    Allowed,
}

/// Method used to read the permit nonce of an owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NonceAccessor {
    /// `nonces(address)`.
    #[default]
    Nonces,
    /// `_nonces(address)`, exposed by some deployed tokens.
    UnderscoreNonces,
}

impl NonceAccessor {
    /// Returns the accessor method name.
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Nonces => "nonces",
            Self::UnderscoreNonces => "_nonces",
        }
    }
}

/// EIP-712 signing domain declared by a token.
///
/// At least one field is expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitDomain {
    /// Domain name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Domain version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Chain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Verifying contract, usually the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<Address>,
    /// Domain salt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<B256>,
}

impl PermitDomain {
    /// Returns the [`Eip712Domain`].
    pub fn to_eip712(&self) -> Eip712Domain {
        Eip712Domain::new(
            self.name.clone().map(Into::into),
            self.version.clone().map(Into::into),
            self.chain_id.map(U256::from),
            self.verifying_contract,
            self.salt,
        )
    }
}

/// Permit configuration of a token.
///
/// Serialized in the token list format: `{ "type": "EIP2612", "variant": "PACKED", "domain": .. }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPermitConfig", into = "RawPermitConfig")]
pub struct PermitConfig {
    /// The signature scheme.
    pub standard: PermitStandard,
    /// How to read the signer's nonce.
    pub nonce_accessor: NonceAccessor,
    /// Signing domain.
    pub domain: PermitDomain,
}

impl PermitConfig {
    /// Create a new instance of [`PermitConfig`] using `nonces` for the nonce.
    pub fn new(standard: PermitStandard, domain: PermitDomain) -> Self {
        Self { standard, nonce_accessor: NonceAccessor::Nonces, domain }
    }

    /// Sets the nonce accessor.
    pub fn with_nonce_accessor(mut self, nonce_accessor: NonceAccessor) -> Self {
        self.nonce_accessor = nonce_accessor;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPermitConfig {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variant: Option<String>,
    #[serde(default)]
    domain: PermitDomain,
}

impl TryFrom<RawPermitConfig> for PermitConfig {
    type Error = PermitError;

    fn try_from(raw: RawPermitConfig) -> Result<Self, Self::Error> {
        let (standard, nonce_accessor) = match (raw.kind.as_str(), raw.variant.as_deref()) {
            ("EIP2612", Some("PACKED")) => (PermitStandard::Eip2612Packed, NonceAccessor::Nonces),
            ("EIP2612", Some("UNDERSCORE_NONCES")) => {
                (PermitStandard::Eip2612, NonceAccessor::UnderscoreNonces)
            }
            ("EIP2612", variant) => {
                if let Some(variant) = variant {
                    warn!(%variant, "Unknown EIP2612 permit variant, using standard EIP2612");
                }
                (PermitStandard::Eip2612, NonceAccessor::Nonces)
            }
            ("ALLOWED", variant) => {
                if let Some(variant) = variant {
                    warn!(%variant, "Ignoring variant of ALLOWED permit");
                }
                (PermitStandard::Allowed, NonceAccessor::Nonces)
            }
            (kind, _) => return Err(PermitError::UnsupportedPermitStandard(kind.to_string())),
        };
        Ok(Self { standard, nonce_accessor, domain: raw.domain })
    }
}

impl From<PermitConfig> for RawPermitConfig {
    fn from(config: PermitConfig) -> Self {
        let (kind, variant) = match (config.standard, config.nonce_accessor) {
            (PermitStandard::Eip2612, NonceAccessor::Nonces) => ("EIP2612", None),
            (PermitStandard::Eip2612, NonceAccessor::UnderscoreNonces) => {
                ("EIP2612", Some("UNDERSCORE_NONCES"))
            }
            (PermitStandard::Eip2612Packed, _) => ("EIP2612", Some("PACKED")),
            (PermitStandard::Allowed, _) => ("ALLOWED", None),
        };
        Self { kind: kind.to_string(), variant: variant.map(str::to_string), domain: config.domain }
    }
}

/// Parameters of a permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermitOptions {
    /// The approved spender.
    pub spender: Address,
    /// Approved amount, for EIP-2612 permits.
    pub value: U256,
    /// Approval flag, for DAI-style permits.
    pub allowed: bool,
    /// Deadline (EIP-2612) or expiry (DAI-style), in seconds since the epoch.
    pub deadline: u64,
}

impl PermitOptions {
    /// Unlimited approval of `spender` until `deadline`.
    pub fn new(spender: Address, deadline: u64) -> Self {
        Self { spender, value: U256::MAX, allowed: true, deadline }
    }

    /// Sets the approved amount.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Sets the approval flag.
    pub fn with_allowed(mut self, allowed: bool) -> Self {
        self.allowed = allowed;
        self
    }

    /// Sets the spender.
    pub fn with_spender(mut self, spender: Address) -> Self {
        self.spender = spender;
        self
    }
}

/// An ECDSA permit signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitSignature {
    /// Recovery id, 27 or 28.
    pub v: u8,
    /// `r` component.
    pub r: B256,
    /// `s` component.
    pub s: B256,
    /// The 65-byte `r || s || v` encoding.
    pub raw: Bytes,
}

impl From<Signature> for PermitSignature {
    fn from(signature: Signature) -> Self {
        Self {
            v: 27 + u8::from(signature.v()),
            r: signature.r().into(),
            s: signature.s().into(),
            raw: signature.as_bytes().into(),
        }
    }
}
