//! Network configuration.

use crate::{
    abi::{ContractInterface, builtin_module},
    constants::{WETH_MAINNET, WETH_ROPSTEN},
    resolver::{ContractResolver, validate_address},
    types::{Module, TokenConfig, TokenKind},
};
use alloy::{json_abi::JsonAbi, primitives::Address};
use alloy_chains::{Chain, NamedChain};
use eyre::{Context, OptionExt, bail};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path, sync::Arc};
use tracing::warn;

/// Modules every deployment must provide.
const REQUIRED_MODULES: [Module; 5] =
    [Module::Euler, Module::Exec, Module::Liquidation, Module::Markets, Module::Swap];

/// Deployment of the protocol on a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Chain id of the network.
    pub chain_id: u64,
    /// Addresses of singleton contracts, keyed by name.
    #[serde(default)]
    pub addresses: BTreeMap<String, String>,
    /// Asset prices are quoted in. Defaults to WETH on mainnet and ropsten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_asset: Option<Address>,
    /// The EUL token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eul: Option<TokenConfig>,
    /// ABIs replacing the built-in interfaces, keyed by contract name or token kind.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub abis: BTreeMap<String, JsonAbi>,
}

impl NetworkConfig {
    /// Create a new, empty, [`NetworkConfig`] for `chain_id`.
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            addresses: BTreeMap::new(),
            reference_asset: None,
            eul: None,
            abis: BTreeMap::new(),
        }
    }

    /// Parses an address file as published with each deployment.
    ///
    /// String entries are contract addresses. The `eul` entry is a token list entry.
    pub fn from_addresses_json(chain_id: u64, json: &str) -> eyre::Result<Self> {
        let entries: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(json).wrap_err("failed to parse address file")?;

        let mut config = Self::new(chain_id);
        for (name, value) in entries {
            match value {
                serde_json::Value::String(address) => {
                    validate_address(&address)
                        .wrap_err_with(|| format!("invalid address for {name}"))?;
                    config.addresses.insert(name, address);
                }
                value if name == Module::Eul.name() => {
                    config.eul = Some(serde_json::from_value(value).wrap_err("invalid eul token")?);
                }
                _ => warn!(%name, "Ignoring address file entry"),
            }
        }
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Sets the address of a singleton contract.
    pub fn with_address(mut self, name: impl Into<String>, address: Address) -> Self {
        self.addresses.insert(name.into(), address.to_string());
        self
    }

    /// Sets the reference asset.
    pub fn with_reference_asset(mut self, reference_asset: Address) -> Self {
        self.reference_asset = Some(reference_asset);
        self
    }

    /// Sets the EUL token.
    pub fn with_eul(mut self, eul: TokenConfig) -> Self {
        self.eul = Some(eul);
        self
    }

    /// Sets the ABI of a contract or token kind.
    pub fn with_abi(mut self, name: impl Into<String>, abi: JsonAbi) -> Self {
        self.abis.insert(name.into(), abi);
        self
    }

    /// Returns the reference asset.
    ///
    /// Networks other than mainnet and ropsten must configure one.
    pub fn reference_asset(&self) -> eyre::Result<Address> {
        if let Some(asset) = self.reference_asset {
            return Ok(asset);
        }
        match Chain::from_id(self.chain_id).named() {
            Some(NamedChain::Mainnet) => Ok(WETH_MAINNET),
            Some(NamedChain::Ropsten) => Ok(WETH_ROPSTEN),
            _ => bail!("missing reference asset for chain {}", self.chain_id),
        }
    }

    /// Builds a resolver with every configured contract registered.
    pub fn resolver(&self) -> eyre::Result<ContractResolver> {
        let mut resolver = ContractResolver::new();

        for (name, abi) in &self.abis {
            let kind = match name.as_str() {
                "erc20" => TokenKind::Erc20,
                "eToken" => TokenKind::EToken,
                "dToken" => TokenKind::DToken,
                "pToken" => TokenKind::PToken,
                _ => continue,
            };
            resolver.set_token_interface(kind, Arc::new(ContractInterface::new(abi.clone())));
        }

        for (name, address) in &self.addresses {
            let interface = match self.abis.get(name) {
                Some(abi) => Arc::new(ContractInterface::new(abi.clone())),
                None => match name.parse().ok().and_then(builtin_module) {
                    Some(interface) => interface,
                    None => {
                        warn!(%name, "Skipping contract without interface");
                        continue;
                    }
                },
            };
            resolver
                .add_contract(name.as_str(), address, interface)
                .wrap_err_with(|| format!("invalid address for {name}"))?;
        }

        if let Some(eul) = &self.eul {
            let interface = builtin_module(Module::Eul).ok_or_eyre("missing eul interface")?;
            resolver.register(Module::Eul.name(), eul.address, interface);
        }

        for module in REQUIRED_MODULES {
            if resolver.module(module).is_err() {
                bail!("missing address for {module} on chain {}", self.chain_id);
            }
        }

        Ok(resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{EXEC, MARKETS, test_config},
        types::PermitStandard,
    };
    use alloy::primitives::address;

    #[test]
    fn reference_asset_defaults() {
        assert_eq!(NetworkConfig::new(1).reference_asset().unwrap(), WETH_MAINNET);
        assert_eq!(NetworkConfig::new(3).reference_asset().unwrap(), WETH_ROPSTEN);
        assert!(NetworkConfig::new(31337).reference_asset().is_err());

        let asset = address!("0x0000000000000000000000000000000000000abc");
        let config = NetworkConfig::new(31337).with_reference_asset(asset);
        assert_eq!(config.reference_asset().unwrap(), asset);
    }

    #[test]
    fn parses_address_file() {
        let config = NetworkConfig::from_addresses_json(
            1,
            r#"{
                "euler": "0x27182842e098f60e3d576794a5bffb0777e025d3",
                "exec": "0x59828fdf7ee634aaad3f58b19fdba3b03e2d9d80",
                "eul": {
                    "address": "0xd9fcd98c322942075a5c3860693e9f4f03aae07b",
                    "symbol": "EUL",
                    "decimals": 18,
                    "extensions": { "permit": { "type": "EIP2612", "domain": { "name": "Euler" } } }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.addresses.len(), 2);
        let eul = config.eul.unwrap();
        assert_eq!(eul.symbol, "EUL");
        assert!(eul.permit().is_ok());

        // unknown permit variants do not prevent loading the file
        let config = NetworkConfig::from_addresses_json(
            1,
            r#"{
                "eul": {
                    "address": "0xd9fcd98c322942075a5c3860693e9f4f03aae07b",
                    "extensions": { "permit": { "type": "ALLOWED", "variant": "UNDERSCORE_NONCES" } }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.eul.unwrap().permit().unwrap().standard, PermitStandard::Allowed);

        let err = NetworkConfig::from_addresses_json(1, r#"{ "exec": "0x1234" }"#).unwrap_err();
        assert!(err.to_string().contains("invalid address for exec"));
    }

    #[test]
    fn builds_resolver() {
        let resolver = test_config().resolver().unwrap();
        assert_eq!(resolver.module(Module::Exec).unwrap().address, EXEC);
        assert_eq!(resolver.module(Module::Markets).unwrap().address, MARKETS);

        // keys are matched with a lowercase first character
        let mut config = test_config();
        let exec = config.addresses.remove("exec").unwrap();
        config.addresses.insert("Exec".to_string(), exec);
        let resolver = config.resolver().unwrap();
        assert_eq!(resolver.module(Module::Exec).unwrap().address, EXEC);

        let mut config = test_config();
        config.addresses.remove("swap");
        let err = config.resolver().unwrap_err();
        assert!(err.to_string().contains("missing address for swap"));
    }

    #[test]
    fn yaml_roundtrip() {
        let config = test_config();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("chainId: 1"));
        assert_eq!(serde_yaml::from_str::<NetworkConfig>(&yaml).unwrap(), config);
    }
}
