//! Scalar type converters

use types::{ConversionError, Value};

/// Conversion of a property value into a concrete Rust type
pub trait TypeConverter<T> {
    /// Convert `value`, using the first element of lists
    fn convert(&self, value: &Value) -> Result<T, ConversionError>;
}

/// Converts values to `i32`
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerConverter;

/// Converts values to `f64`
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleConverter;

/// Converts values to `bool`
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl TypeConverter<i32> for IntegerConverter {
    fn convert(&self, value: &Value) -> Result<i32, ConversionError> {
        const TARGET: &str = "i32";

        match first_scalar(value, TARGET)? {
            Value::Integer(i) => i32::try_from(*i).map_err(|_| out_of_range(TARGET, i)),
            Value::Double(d) => {
                let truncated = d.trunc();
                if d.is_finite()
                    && truncated >= f64::from(i32::MIN)
                    && truncated <= f64::from(i32::MAX)
                {
                    Ok(truncated as i32)
                } else {
                    Err(out_of_range(TARGET, d))
                }
            }
            Value::String(s) => {
                let n = parse_integer(s).ok_or_else(|| invalid(TARGET, s))?;
                i32::try_from(n).map_err(|_| out_of_range(TARGET, s.trim()))
            }
            other => Err(ConversionError::Unsupported {
                target: TARGET,
                kind: other.kind(),
            }),
        }
    }
}

impl TypeConverter<f64> for DoubleConverter {
    fn convert(&self, value: &Value) -> Result<f64, ConversionError> {
        const TARGET: &str = "f64";

        match first_scalar(value, TARGET)? {
            Value::Integer(i) => Ok(*i as f64),
            Value::Double(d) => Ok(*d),
            Value::String(s) => {
                let text = s.trim();
                text.parse::<f64>()
                    .ok()
                    .or_else(|| parse_integer(text).map(|n| n as f64))
                    .ok_or_else(|| invalid(TARGET, s))
            }
            other => Err(ConversionError::Unsupported {
                target: TARGET,
                kind: other.kind(),
            }),
        }
    }
}

impl TypeConverter<bool> for BooleanConverter {
    fn convert(&self, value: &Value) -> Result<bool, ConversionError> {
        const TARGET: &str = "bool";

        match first_scalar(value, TARGET)? {
            Value::Boolean(b) => Ok(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "y" | "t" | "1" => Ok(true),
                "false" | "no" | "off" | "n" | "f" | "0" => Ok(false),
                _ => Err(invalid(TARGET, s)),
            },
            other => Err(ConversionError::Unsupported {
                target: TARGET,
                kind: other.kind(),
            }),
        }
    }
}

fn first_scalar<'v>(value: &'v Value, target: &'static str) -> Result<&'v Value, ConversionError> {
    value.first().ok_or(ConversionError::Unsupported {
        target,
        kind: "empty list",
    })
}

/// Parse decimal, `0x` hexadecimal or `0b` binary integers with an optional sign
fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = unsigned
        .strip_prefix("0b")
        .or_else(|| unsigned.strip_prefix("0B"))
    {
        (2, bin)
    } else {
        (10, unsigned)
    };

    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn invalid(target: &'static str, value: &str) -> ConversionError {
    ConversionError::InvalidValue {
        target,
        value: value.to_string(),
    }
}

fn out_of_range(target: &'static str, value: impl ToString) -> ConversionError {
    ConversionError::OutOfRange {
        target,
        value: value.to_string(),
    }
}
