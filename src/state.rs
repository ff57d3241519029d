use std::fs;
use std::path::{Path, PathBuf};

use grove_sdk::config::{
    CONTRACT_ADDRESS_VAR, GATEWAY_VAR, NETWORK_VAR, PIN_ENDPOINT_VAR, RPC_URL_VAR,
};
use grove_sdk::{ChainConfig, Network};
use serde::{Deserialize, Serialize};

pub const SETTINGS_FILE: &str = "grove_settings.json";
const DATA_DIR_NAME: &str = ".grove";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Persisted settings
// ============================================================================

/// User choices that survive between runs. Unset fields fall through to the
/// environment and then to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

impl Settings {
    /// The value this file holds for one of the `GROVE_*` variables.
    pub fn lookup(&self, key: &str) -> Option<String> {
        match key {
            NETWORK_VAR => self.network.map(|n| n.as_str().to_string()),
            CONTRACT_ADDRESS_VAR => self.contract_address.clone(),
            RPC_URL_VAR => self.rpc_url.clone(),
            PIN_ENDPOINT_VAR => self.pin_endpoint.clone(),
            GATEWAY_VAR => self.gateway.clone(),
            _ => None,
        }
    }
}

// ============================================================================
// Settings manager
// ============================================================================

pub struct SettingsManager {
    data_dir: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    pub fn new(data_dir: PathBuf) -> Self {
        let settings = Self::load(&data_dir).unwrap_or_default();
        Self { data_dir, settings }
    }

    /// `$HOME/.grove`, or `.grove` in the working directory without a home.
    pub fn default_data_dir() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(DATA_DIR_NAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn is_first_launch(&self) -> bool {
        !self.settings_path().exists()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_network(&mut self, network: Network) -> Result<Settings, SettingsError> {
        self.settings.network = Some(network);
        self.save()?;
        Ok(self.settings.clone())
    }

    pub fn update(&mut self, f: impl FnOnce(&mut Settings)) -> Result<Settings, SettingsError> {
        f(&mut self.settings);
        self.save()?;
        Ok(self.settings.clone())
    }

    /// Environment first, then this file, then the literal defaults.
    pub fn chain_config<F>(&self, env: F) -> ChainConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        ChainConfig::resolve(|key| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| self.settings.lookup(key))
        })
    }

    // --- Persistence helpers ---

    fn load(dir: &Path) -> Option<Settings> {
        let path = dir.join(SETTINGS_FILE);
        let contents = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("ignoring unreadable {}: {e}", path.display());
                None
            }
        }
    }

    fn save(&self) -> Result<(), SettingsError> {
        fs::create_dir_all(&self.data_dir)?;
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(self.settings_path(), json)?;
        Ok(())
    }
}
