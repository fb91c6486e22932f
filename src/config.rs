use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::diagnostics::ConfigError;

pub const DEFAULT_CONTRACTS_NAMESPACE: &str = "System.Diagnostics.Contracts";
pub const DEFAULT_CHECK_INTERVAL: usize = 64;

/// Engine settings, usually read from a `refactorkit.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub providers: ProvidersConfig,
    pub contracts: ContractsConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Provider ids that never run.
    pub disabled: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractsConfig {
    /// Namespace whose using directive accompanies inserted contracts.
    pub namespace: String,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self { namespace: DEFAULT_CONTRACTS_NAMESPACE.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Nodes visited between cancellation checks.
    pub check_interval: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { check_interval: DEFAULT_CHECK_INTERVAL }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn is_enabled(&self, provider_id: &str) -> bool {
        !self.providers.disabled.contains(provider_id)
    }
}
