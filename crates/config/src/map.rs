//! In-memory configuration backed by a sorted map

use crate::configuration::{merge_values, split_value, Configuration};
use converter::LIST_DELIMITER;
use std::collections::BTreeMap;
use types::{Result, Value};

/// Configuration held entirely in memory
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfiguration {
    map: BTreeMap<String, Value>,
    list_delimiter: Option<char>,
}

impl MapConfiguration {
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
            list_delimiter: Some(LIST_DELIMITER),
        }
    }

    /// Use a different list delimiter, or disable splitting with `None`
    pub fn with_list_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.list_delimiter = delimiter;
        self
    }

    /// Wrap an existing map; values are stored as given, without splitting
    pub fn from_map(map: BTreeMap<String, Value>) -> Self {
        Self {
            map,
            ..Self::new()
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

impl Default for MapConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration for MapConfiguration {
    fn get_property(&self, key: &str) -> Option<Value> {
        self.map.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }

    fn add_property(&mut self, key: &str, value: Value) -> Result<()> {
        let additions = split_value(value, self.list_delimiter);
        if let Some(merged) = merge_values(self.map.remove(key), additions) {
            self.map.insert(key.to_string(), merged);
        }
        Ok(())
    }

    fn clear_property(&mut self, key: &str) -> Result<()> {
        self.map.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.map.clear();
        Ok(())
    }

    fn list_delimiter(&self) -> Option<char> {
        self.list_delimiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{ConfigurationError, ConversionError};

    #[test]
    fn test_add_splits_on_delimiter() {
        let mut config = MapConfiguration::new();
        config.add_property("hosts", Value::from("a, b,c")).unwrap();

        assert_eq!(
            config.get_property("hosts"),
            Some(Value::from(vec!["a", "b", "c"]))
        );
        assert_eq!(config.get_list("hosts").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(config.get_string("hosts").unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn test_add_appends_to_existing() {
        let mut config = MapConfiguration::new();
        config.add_property("key", Value::from("one")).unwrap();
        config.add_property("key", Value::from("two")).unwrap();

        assert_eq!(
            config.get_property("key"),
            Some(Value::from(vec!["one", "two"]))
        );

        config.set_property("key", Value::from("three")).unwrap();
        assert_eq!(config.get_property("key"), Some(Value::from("three")));
    }

    #[test]
    fn test_escaped_delimiter_is_kept() {
        let mut config = MapConfiguration::new();
        config
            .add_property("greeting", Value::from(r"hello\, world"))
            .unwrap();
        assert_eq!(
            config.get_string("greeting").unwrap().as_deref(),
            Some("hello, world")
        );
    }

    #[test]
    fn test_splitting_disabled() {
        let mut config = MapConfiguration::new().with_list_delimiter(None);
        config.add_property("csv", Value::from("a,b")).unwrap();
        assert_eq!(config.get_property("csv"), Some(Value::from("a,b")));
    }

    #[test]
    fn test_typed_getters_interpolate() {
        let mut config = MapConfiguration::new();
        config.add_property("base", Value::from("8080")).unwrap();
        config.add_property("port", Value::from("${base}")).unwrap();
        config.add_property("ratio", Value::from(0.5)).unwrap();
        config.add_property("enabled", Value::from("yes")).unwrap();

        assert_eq!(config.get_i32("port").unwrap(), Some(8080));
        assert_eq!(config.get_f64("ratio").unwrap(), Some(0.5));
        assert_eq!(config.get_bool("enabled").unwrap(), Some(true));
        assert_eq!(config.get_i32("missing").unwrap(), None);
    }

    #[test]
    fn test_conversion_failure() {
        let mut config = MapConfiguration::new();
        config.add_property("port", Value::from("http")).unwrap();

        assert!(matches!(
            config.get_i32("port"),
            Err(ConfigurationError::Conversion(ConversionError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_cyclic_reference_fails() {
        let mut config = MapConfiguration::new();
        config.add_property("a", Value::from("${b}")).unwrap();
        config.add_property("b", Value::from("${a}")).unwrap();

        let err = config.get_string("a").unwrap_err();
        assert!(matches!(err, ConfigurationError::Interpolation(_)));
    }

    #[test]
    fn test_require_string() {
        let config = MapConfiguration::new();
        assert!(matches!(
            config.require_string("absent"),
            Err(ConfigurationError::MissingKey { key }) if key == "absent"
        ));
    }

    #[test]
    fn test_clear() {
        let mut config = MapConfiguration::new();
        config.add_property("a", Value::from(1)).unwrap();
        config.add_property("b", Value::from(2)).unwrap();
        assert_eq!(config.keys(), vec!["a", "b"]);

        config.clear_property("a").unwrap();
        assert!(!config.contains_key("a"));

        config.clear().unwrap();
        assert!(config.is_empty());
    }
}
