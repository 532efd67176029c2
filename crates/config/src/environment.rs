//! Read-only view of the process environment

use crate::configuration::Configuration;
use crate::map::MapConfiguration;
use std::collections::BTreeMap;
use tracing::debug;
use types::{ConfigurationError, Result, Value};

/// Snapshot of the environment variables taken at construction time.
///
/// Values are stored verbatim; no list splitting is applied.
#[derive(Debug, Clone)]
pub struct EnvironmentConfiguration {
    store: MapConfiguration,
}

impl EnvironmentConfiguration {
    /// Snapshot the process environment; entries that are not valid UTF-8 are skipped
    pub fn new() -> Self {
        let vars = std::env::vars_os().filter_map(|(key, value)| {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    debug!(key = ?key, "Skipping environment variable that is not valid UTF-8");
                    None
                }
            }
        });
        Self::from_vars(vars)
    }

    /// Build from an explicit set of variables
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let map: BTreeMap<String, Value> = vars
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_string(), Value::String(value.into())))
            .collect();
        let store = MapConfiguration::from_map(map).with_list_delimiter(None);
        debug!(variables = store.len(), "Environment snapshot taken");
        Self { store }
    }

    fn read_only(operation: &str) -> ConfigurationError {
        ConfigurationError::ReadOnly {
            operation: operation.to_string(),
        }
    }
}

impl Default for EnvironmentConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration for EnvironmentConfiguration {
    fn get_property(&self, key: &str) -> Option<Value> {
        self.store.get_property(key)
    }

    fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    fn add_property(&mut self, _key: &str, _value: Value) -> Result<()> {
        Err(Self::read_only("add a property"))
    }

    fn clear_property(&mut self, _key: &str) -> Result<()> {
        Err(Self::read_only("clear a property"))
    }

    fn set_property(&mut self, _key: &str, _value: Value) -> Result<()> {
        Err(Self::read_only("set a property"))
    }

    fn clear(&mut self) -> Result<()> {
        Err(Self::read_only("clear the configuration"))
    }

    fn list_delimiter(&self) -> Option<char> {
        None
    }
}
