//! Chain and endpoint configuration, resolved from the environment with
//! literal fallbacks.

use crate::network::Network;

pub const NETWORK_VAR: &str = "GROVE_NETWORK";
pub const CONTRACT_ADDRESS_VAR: &str = "GROVE_CONTRACT_ADDRESS";
pub const RPC_URL_VAR: &str = "GROVE_RPC_URL";
pub const PIN_ENDPOINT_VAR: &str = "GROVE_PIN_ENDPOINT";
pub const GATEWAY_VAR: &str = "GROVE_IPFS_GATEWAY";
pub const APP_URL_VAR: &str = "GROVE_APP_URL";

/// Quest board deployment used when no override is configured.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x7a3b2e4C1d9F0e5A6b8C7D2E1f4A9b3C5d6E8F01";

pub const DEFAULT_PIN_ENDPOINT: &str = "http://localhost:3000/api/pin";
pub const DEFAULT_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs/";
pub const DEFAULT_APP_URL: &str = "https://grove.quest";

/// Everything a client needs to talk to one quest board deployment.
///
/// The contract address is carried as text. It is parsed when a call is
/// encoded, so a malformed override only fails at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub network: Network,
    pub contract_address: String,
    pub rpc_url: String,
    pub pin_endpoint: String,
    pub gateway: String,
    pub app_url: String,
}

impl ChainConfig {
    /// Resolve against an arbitrary variable lookup. Empty values count as unset.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let network = Network::from_flag(get(NETWORK_VAR).as_deref());
        Self {
            network,
            contract_address: get(CONTRACT_ADDRESS_VAR)
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string()),
            rpc_url: get(RPC_URL_VAR).unwrap_or_else(|| network.default_rpc_url().to_string()),
            pin_endpoint: get(PIN_ENDPOINT_VAR).unwrap_or_else(|| DEFAULT_PIN_ENDPOINT.to_string()),
            gateway: get(GATEWAY_VAR).unwrap_or_else(|| DEFAULT_GATEWAY.to_string()),
            app_url: get(APP_URL_VAR).unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
        }
    }

    /// Defaults for a network with no overrides.
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            rpc_url: network.default_rpc_url().to_string(),
            pin_endpoint: DEFAULT_PIN_ENDPOINT.to_string(),
            gateway: DEFAULT_GATEWAY.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }

    /// Quest page of the web front end, used as a share embed.
    pub fn quest_url(&self, id: u64) -> String {
        format!("{}/quest/{}", self.app_url.trim_end_matches('/'), id)
    }
}
