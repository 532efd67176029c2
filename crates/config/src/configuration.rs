//! The property access abstraction shared by every store

use converter::{
    flatten, BooleanConverter, DoubleConverter, IntegerConverter, TypeConverter, VariableLookup,
    LIST_DELIMITER,
};
use types::{ConfigurationError, Result, Value};

/// Flat key/value property store.
///
/// Stores implement the raw accessors; the typed getters interpolate
/// `${key}` references against the store itself.
pub trait Configuration: Send + Sync {
    /// Raw value stored under `key`
    fn get_property(&self, key: &str) -> Option<Value>;

    /// All keys, in the store's iteration order
    fn keys(&self) -> Vec<String>;

    /// Append a value, splitting strings on the list delimiter
    fn add_property(&mut self, key: &str, value: Value) -> Result<()>;

    /// Remove a key
    fn clear_property(&mut self, key: &str) -> Result<()>;

    /// Replace whatever is stored under `key`
    fn set_property(&mut self, key: &str, value: Value) -> Result<()> {
        self.clear_property(key)?;
        self.add_property(key, value)
    }

    /// Remove every key
    fn clear(&mut self) -> Result<()> {
        for key in self.keys() {
            self.clear_property(&key)?;
        }
        Ok(())
    }

    fn contains_key(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }

    fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Delimiter used to split string values into lists, `None` to disable
    fn list_delimiter(&self) -> Option<char> {
        Some(LIST_DELIMITER)
    }

    /// Interpolate a value against this store
    fn interpolate(&self, value: &Value) -> Result<Value> {
        Ok(converter::interpolate(value, &ConfigurationLookup(self))?)
    }

    /// First value of `key`, interpolated
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get_property(key).as_ref().and_then(Value::first) {
            Some(value) => Ok(Some(self.interpolate(value)?.to_string())),
            None => Ok(None),
        }
    }

    /// Like [`Configuration::get_string`] but fails when the key is absent
    fn require_string(&self, key: &str) -> Result<String> {
        self.get_string(key)?.ok_or_else(|| ConfigurationError::MissingKey {
            key: key.to_string(),
        })
    }

    /// Every value of `key`, interpolated
    fn get_list(&self, key: &str) -> Result<Vec<String>> {
        let Some(value) = self.get_property(key) else {
            return Ok(Vec::new());
        };
        let items = match value {
            Value::List(items) => items,
            scalar => vec![scalar],
        };
        items
            .iter()
            .map(|item| Ok(self.interpolate(item)?.to_string()))
            .collect()
    }

    fn get_i32(&self, key: &str) -> Result<Option<i32>> {
        convert_first(self, key, &IntegerConverter)
    }

    fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        convert_first(self, key, &DoubleConverter)
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        convert_first(self, key, &BooleanConverter)
    }
}

fn convert_first<C, T>(config: &C, key: &str, converter: &dyn TypeConverter<T>) -> Result<Option<T>>
where
    C: Configuration + ?Sized,
{
    match config.get_property(key).as_ref().and_then(Value::first) {
        Some(value) => Ok(Some(converter.convert(&config.interpolate(value)?)?)),
        None => Ok(None),
    }
}

impl<C: Configuration + ?Sized> Configuration for Box<C> {
    fn get_property(&self, key: &str) -> Option<Value> {
        (**self).get_property(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }

    fn add_property(&mut self, key: &str, value: Value) -> Result<()> {
        (**self).add_property(key, value)
    }

    fn clear_property(&mut self, key: &str) -> Result<()> {
        (**self).clear_property(key)
    }

    fn set_property(&mut self, key: &str, value: Value) -> Result<()> {
        (**self).set_property(key, value)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn list_delimiter(&self) -> Option<char> {
        (**self).list_delimiter()
    }
}

/// Adapts a configuration to the interpolation engine's lookup trait
pub struct ConfigurationLookup<'a, C: ?Sized>(pub &'a C);

impl<C: Configuration + ?Sized> VariableLookup for ConfigurationLookup<'_, C> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.0.get_property(name)
    }
}

/// Values to append for `value`, honoring an optional list delimiter
pub(crate) fn split_value(value: Value, delimiter: Option<char>) -> Vec<Value> {
    match delimiter {
        Some(d) => flatten(Some(value.into()), d),
        None => match value {
            Value::List(items) => items,
            scalar => vec![scalar],
        },
    }
}

/// Append `additions` to an existing value; one element stays scalar
pub(crate) fn merge_values(existing: Option<Value>, additions: Vec<Value>) -> Option<Value> {
    let mut items = match existing {
        None => Vec::new(),
        Some(Value::List(items)) => items,
        Some(scalar) => vec![scalar],
    };
    items.extend(additions);

    match items.len() {
        0 => None,
        1 => items.pop(),
        _ => Some(Value::List(items)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_value() {
        assert_eq!(
            split_value(Value::from("a, b"), Some(',')),
            vec![Value::from("a"), Value::from("b")]
        );
        assert_eq!(split_value(Value::from("a, b"), None), vec![Value::from("a, b")]);
        assert_eq!(
            split_value(Value::from(vec![1, 2]), None),
            vec![Value::Integer(1), Value::Integer(2)]
        );
    }

    #[test]
    fn test_merge_values() {
        assert_eq!(merge_values(None, vec![]), None);
        assert_eq!(merge_values(None, vec![Value::from(1)]), Some(Value::from(1)));
        assert_eq!(
            merge_values(Some(Value::from(1)), vec![Value::from(2)]),
            Some(Value::from(vec![1, 2]))
        );
        assert_eq!(
            merge_values(Some(Value::from(vec![1, 2])), vec![Value::from(3)]),
            Some(Value::from(vec![1, 2, 3]))
        );
    }
}
