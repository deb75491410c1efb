//! Merged per-type configuration and the conventional file it loads from.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::WiringError;
use crate::value::{merge_map, ConfigMap, ConfigValue};

/// Name of the configuration file looked up directly under a container's
/// root directory.
pub const CONFIG_FILE: &str = "container.toml";

/// Nested mapping from type name to named parameter overrides.
///
/// Blocks deep-merge in registration order: nested maps combine key by
/// key, scalars and lists at the same key are replaced by the newer block.
#[derive(Debug, Default)]
pub(crate) struct ConfigStore {
    merged: ConfigMap,
}

impl ConfigStore {
    pub fn register(&mut self, block: ConfigMap) {
        merge_map(&mut self.merged, block);
    }

    pub fn snapshot(&self) -> ConfigMap {
        self.merged.clone()
    }

    /// Parameter overrides recorded for one type name.
    ///
    /// A non-map entry cannot hold named parameters and is ignored.
    pub fn for_type(&self, type_name: &str) -> ConfigMap {
        match self.merged.get(type_name) {
            None => ConfigMap::new(),
            Some(ConfigValue::Map(params)) => params.clone(),
            Some(_) => {
                warn!("configuration for `{}` is not a map of parameters", type_name);
                ConfigMap::new()
            }
        }
    }
}

/// Read the conventional configuration file under `root`, if present.
///
/// A missing file yields an empty block; an unreadable or unparsable file
/// is a [WiringError::ConfigFile].
pub(crate) fn load_config_file(root: &Path) -> Result<ConfigMap, WiringError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ConfigMap::new());
    }
    let text = fs::read_to_string(&path).map_err(|e| WiringError::ConfigFile {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    let table = text
        .parse::<toml::Table>()
        .map_err(|e| WiringError::ConfigFile {
            path: path.clone(),
            reason: e.to_string(),
        })?;
    debug!("loaded configuration from {}", path.display());
    Ok(table
        .into_iter()
        .map(|(name, value)| (name, ConfigValue::from(value)))
        .collect())
}

impl From<toml::Value> for ConfigValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(text) => ConfigValue::Str(text),
            toml::Value::Integer(number) => ConfigValue::Int(number),
            toml::Value::Float(number) => ConfigValue::Float(number),
            toml::Value::Boolean(flag) => ConfigValue::Bool(flag),
            toml::Value::Datetime(stamp) => ConfigValue::Str(stamp.to_string()),
            toml::Value::Array(items) => {
                ConfigValue::List(items.into_iter().map(ConfigValue::from).collect())
            }
            toml::Value::Table(table) => ConfigValue::Map(
                table
                    .into_iter()
                    .map(|(name, value)| (name, ConfigValue::from(value)))
                    .collect(),
            ),
        }
    }
}
