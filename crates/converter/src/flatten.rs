//! Flattening of nested property values into ordered scalars

use crate::split::split;
use std::fmt;
use types::Value;

/// A value that can be expanded into a flat sequence of scalars
pub enum Flattenable {
    /// Terminal value, emitted unchanged
    Scalar(Value),
    /// Ordered container (array or collection)
    Sequence(Vec<Flattenable>),
    /// Sequence produced on demand, consumed exactly once
    Lazy(Box<dyn Iterator<Item = Flattenable> + Send>),
    /// String holding delimiter-separated elements
    Delimited(String),
}

impl Flattenable {
    /// Wrap an iterator as a lazily consumed sequence
    pub fn lazy<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Flattenable> + 'static,
        I::IntoIter: Send + 'static,
    {
        Flattenable::Lazy(Box::new(items.into_iter().map(into_flattenable::<I::Item>)))
    }
}

fn into_flattenable<T: Into<Flattenable>>(item: T) -> Flattenable {
    item.into()
}

impl fmt::Debug for Flattenable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flattenable::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Flattenable::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Flattenable::Lazy(_) => f.write_str("Lazy(..)"),
            Flattenable::Delimited(s) => f.debug_tuple("Delimited").field(s).finish(),
        }
    }
}

impl From<Value> for Flattenable {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Flattenable::Delimited(s),
            Value::List(items) => Flattenable::Sequence(items.into_iter().map(Into::into).collect()),
            scalar => Flattenable::Scalar(scalar),
        }
    }
}

impl From<&str> for Flattenable {
    fn from(s: &str) -> Self {
        Flattenable::Delimited(s.to_string())
    }
}

impl From<String> for Flattenable {
    fn from(s: String) -> Self {
        Flattenable::Delimited(s)
    }
}

impl From<i64> for Flattenable {
    fn from(i: i64) -> Self {
        Flattenable::Scalar(Value::Integer(i))
    }
}

impl From<i32> for Flattenable {
    fn from(i: i32) -> Self {
        Flattenable::Scalar(Value::from(i))
    }
}

impl From<f64> for Flattenable {
    fn from(d: f64) -> Self {
        Flattenable::Scalar(Value::Double(d))
    }
}

impl From<bool> for Flattenable {
    fn from(b: bool) -> Self {
        Flattenable::Scalar(Value::Boolean(b))
    }
}

impl<T: Into<Flattenable>> From<Vec<T>> for Flattenable {
    fn from(items: Vec<T>) -> Self {
        Flattenable::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Expand a possibly nested value into a flat, ordered list of scalars.
///
/// Delimited strings are split (with trimming) on `delimiter`; the
/// resulting tokens are terminal string scalars.
pub fn flatten(value: Option<Flattenable>, delimiter: char) -> Vec<Value> {
    let mut out = Vec::new();
    if let Some(value) = value {
        flatten_into(value, delimiter, &mut out);
    }
    out
}

/// Iterate over the flattened scalars of a value
pub fn to_iter(value: Option<Flattenable>, delimiter: char) -> impl Iterator<Item = Value> {
    flatten(value, delimiter).into_iter()
}

fn flatten_into(value: Flattenable, delimiter: char, out: &mut Vec<Value>) {
    match value {
        Flattenable::Scalar(v) => out.push(v),
        Flattenable::Delimited(s) => {
            out.extend(split(Some(&s), delimiter, true).into_iter().map(Value::String))
        }
        Flattenable::Sequence(items) => {
            for item in items {
                flatten_into(item, delimiter, out);
            }
        }
        Flattenable::Lazy(items) => {
            for item in items {
                flatten_into(item, delimiter, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLATTEN_VALUES: [i64; 7] = [1, 2, 3, 4, 5, 6, 28];

    fn check_flatten_result(values: Vec<Value>) {
        let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
        let expected: Vec<String> = FLATTEN_VALUES.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_flatten_none() {
        assert!(flatten(None, ',').is_empty());
    }

    #[test]
    fn test_flatten_sequence() {
        check_flatten_result(flatten(Some(FLATTEN_VALUES.to_vec().into()), ','));
    }

    #[test]
    fn test_flatten_nested_sequence() {
        let nested = Flattenable::Sequence(vec![
            1i64.into(),
            Flattenable::Sequence(vec![2i64.into(), 3i64.into()]),
        ]);
        assert_eq!(
            flatten(Some(nested), ','),
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
    }

    #[test]
    fn test_flatten_lazy() {
        check_flatten_result(flatten(Some(Flattenable::lazy(FLATTEN_VALUES)), ','));
    }

    #[test]
    fn test_flatten_delimited_string() {
        let joined = FLATTEN_VALUES
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let values = flatten(Some(joined.into()), ',');
        assert!(values.iter().all(|v| matches!(v, Value::String(_))));
        check_flatten_result(values);

        assert_eq!(
            flatten(Some("1,2,3".into()), ','),
            vec![Value::from("1"), Value::from("2"), Value::from("3")]
        );
    }

    #[test]
    fn test_flatten_mixed() {
        let inner = Flattenable::Sequence(vec![
            "5".into(),
            Flattenable::Sequence(vec![6i64.into(), "28".into()]),
        ]);
        let data = Flattenable::Sequence(vec![
            1i64.into(),
            "2,3".into(),
            Flattenable::Sequence(vec![4i64.into(), inner]),
        ]);
        check_flatten_result(flatten(Some(data), ','));
    }

    #[test]
    fn test_flatten_lazy_inside_sequence() {
        let data = Flattenable::Sequence(vec![
            Flattenable::lazy(vec!["1;2", "3"]),
            Flattenable::Scalar(Value::Boolean(true)),
        ]);
        assert_eq!(
            flatten(Some(data), ';'),
            vec![
                Value::from("1"),
                Value::from("2"),
                Value::from("3"),
                Value::Boolean(true)
            ]
        );
    }

    #[test]
    fn test_value_list_conversion() {
        let value = Value::List(vec![Value::from("a, b"), Value::from(7)]);
        assert_eq!(
            flatten(Some(value.into()), ','),
            vec![Value::from("a"), Value::from("b"), Value::Integer(7)]
        );
    }

    #[test]
    fn test_to_iter() {
        let mut it = to_iter(Some(vec![1i64, 2, 3].into()), ',');
        assert_eq!(it.next(), Some(Value::Integer(1)));
        assert_eq!(it.next(), Some(Value::Integer(2)));
        assert_eq!(it.next(), Some(Value::Integer(3)));
        assert_eq!(it.next(), None);
    }
}
