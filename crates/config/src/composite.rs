//! Layered configuration combining several stores

use crate::configuration::Configuration;
use crate::map::MapConfiguration;
use std::collections::BTreeSet;
use types::{ConfigurationError, Result, Value};

/// Ordered set of child configurations.
///
/// Lookups return the value of the first child that defines the key.
/// Writes go to an in-memory layer that sits in front of every child.
pub struct CompositeConfiguration {
    in_memory: MapConfiguration,
    children: Vec<Box<dyn Configuration>>,
}

impl CompositeConfiguration {
    pub fn new() -> Self {
        Self {
            in_memory: MapConfiguration::new(),
            children: Vec::new(),
        }
    }

    /// Append a child with lower priority than those already added
    pub fn add_configuration(&mut self, child: impl Configuration + 'static) {
        self.children.push(Box::new(child));
    }

    /// Builder form of [`CompositeConfiguration::add_configuration`]
    pub fn with(mut self, child: impl Configuration + 'static) -> Self {
        self.add_configuration(child);
        self
    }

    /// Number of children, not counting the in-memory layer
    pub fn configuration_count(&self) -> usize {
        self.children.len()
    }

    pub fn in_memory(&self) -> &MapConfiguration {
        &self.in_memory
    }

    fn layers(&self) -> impl Iterator<Item = &dyn Configuration> + '_ {
        std::iter::once(&self.in_memory as &dyn Configuration)
            .chain(self.children.iter().map(|c| c.as_ref() as &dyn Configuration))
    }
}

impl Default for CompositeConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration for CompositeConfiguration {
    fn get_property(&self, key: &str) -> Option<Value> {
        self.layers().find_map(|layer| layer.get_property(key))
    }

    fn keys(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut keys = Vec::new();
        for key in self.layers().flat_map(|layer| layer.keys()) {
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
        keys
    }

    fn add_property(&mut self, key: &str, value: Value) -> Result<()> {
        self.in_memory.add_property(key, value)
    }

    fn clear_property(&mut self, key: &str) -> Result<()> {
        self.in_memory.clear_property(key)?;
        for child in &mut self.children {
            match child.clear_property(key) {
                Err(ConfigurationError::ReadOnly { .. }) => {
                    tracing::debug!(key, "Skipping read-only configuration");
                }
                other => other?,
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.in_memory.clear()?;
        self.children.clear();
        Ok(())
    }
}
