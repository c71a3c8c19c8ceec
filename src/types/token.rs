use super::PermitConfig;
use crate::error::PermitError;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Token list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfig {
    /// Token address.
    pub address: Address,
    /// Token name.
    #[serde(default)]
    pub name: String,
    /// Token symbol.
    #[serde(default)]
    pub symbol: String,
    /// Token decimals.
    #[serde(default)]
    pub decimals: u8,
    /// Chain the token is deployed on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Token list extensions.
    #[serde(default)]
    pub extensions: TokenExtensions,
}

/// Token list extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenExtensions {
    /// Permit support.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit: Option<PermitConfig>,
}

impl TokenConfig {
    /// Create a new instance of [`TokenConfig`] with no metadata.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            name: String::new(),
            symbol: String::new(),
            decimals: 18,
            chain_id: None,
            extensions: TokenExtensions::default(),
        }
    }

    /// Sets the permit configuration.
    pub fn with_permit(mut self, permit: PermitConfig) -> Self {
        self.extensions.permit = Some(permit);
        self
    }

    /// Returns the permit configuration.
    pub fn permit(&self) -> Result<&PermitConfig, PermitError> {
        self.extensions.permit.as_ref().ok_or(PermitError::MissingPermitConfig(self.address))
    }
}
