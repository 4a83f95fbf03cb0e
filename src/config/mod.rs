use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::core::utils::{ensure_dir, write_atomic, PathResolver};
use crate::currency::CurrencyCode;
use crate::errors::{LedgerError, LedgerResult};

/// Engine settings. Every field has a default, so partial files load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Name given to a freshly created group.
    pub default_group_name: String,
    pub default_currency: String,
    /// Key the active group is stored under.
    pub storage_key: String,
    /// Newest activity entries kept in persisted snapshots; `None` keeps all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_retention: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_group_name: "My Group".into(),
            default_currency: "USD".into(),
            storage_key: "active-group".into(),
            activity_retention: None,
            data_dir: None,
        }
    }
}

impl EngineConfig {
    pub fn currency(&self) -> LedgerResult<CurrencyCode> {
        CurrencyCode::parse(&self.default_currency)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        self.currency()?;
        if self.default_group_name.trim().is_empty() {
            return Err(LedgerError::validation(
                "defaultGroupName must not be empty",
            ));
        }
        if self.storage_key.trim().is_empty() {
            return Err(LedgerError::validation("storageKey must not be empty"));
        }
        if self.activity_retention == Some(0) {
            return Err(LedgerError::validation(
                "activityRetention must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Loads and saves [`EngineConfig`] as `config.json` under the app data dir.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> LedgerResult<Self> {
        Self::from_base(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> LedgerResult<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> LedgerResult<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Loads the config file, or the defaults when it does not exist.
    pub fn load(&self) -> LedgerResult<EngineConfig> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)?
        } else {
            EngineConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &EngineConfig) -> LedgerResult<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
