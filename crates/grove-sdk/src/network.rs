use serde::{Deserialize, Serialize};

/// Networks the quest board contract is deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    Base,
    BaseSepolia,
}

/// Values of the network flag that select the main network.
pub const PRODUCTION_ALIASES: &[&str] = &["mainnet", "main", "base", "production"];

impl Network {
    /// Main network only for a recognised production alias, test network otherwise.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(|f| f.trim().to_lowercase()) {
            Some(f) if PRODUCTION_ALIASES.contains(&f.as_str()) => Network::Base,
            _ => Network::BaseSepolia,
        }
    }

    pub fn chain_id(self) -> u64 {
        match self {
            Network::Base => 8453,
            Network::BaseSepolia => 84532,
        }
    }

    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Network::Base => "https://mainnet.base.org",
            Network::BaseSepolia => "https://sepolia.base.org",
        }
    }

    pub fn explorer_url(self) -> &'static str {
        match self {
            Network::Base => "https://basescan.org",
            Network::BaseSepolia => "https://sepolia.basescan.org",
        }
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url(), tx_hash)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Base => "base",
            Network::BaseSepolia => "base-sepolia",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base" | "mainnet" | "main" | "production" => Ok(Network::Base),
            "base-sepolia" | "basesepolia" | "sepolia" | "testnet" => Ok(Network::BaseSepolia),
            _ => Err(format!("invalid network: {}", s)),
        }
    }
}
