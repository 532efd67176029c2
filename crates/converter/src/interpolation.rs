//! `${name}` variable interpolation with cycle detection

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use tracing::{debug, trace};
use types::{InterpolationError, Value};

const VARIABLE_START: &str = "${";
const VARIABLE_END: &str = "}";
const ESCAPE: char = '$';

/// Source of variable values for interpolation
pub trait VariableLookup {
    /// Current value of the named variable, if it exists
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl<L: VariableLookup + ?Sized> VariableLookup for &L {
    fn lookup(&self, name: &str) -> Option<Value> {
        (**self).lookup(name)
    }
}

impl<L: VariableLookup + ?Sized> VariableLookup for Box<L> {
    fn lookup(&self, name: &str) -> Option<Value> {
        (**self).lookup(name)
    }
}

impl<S: BuildHasher> VariableLookup for HashMap<String, Value, S> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<S: BuildHasher> VariableLookup for HashMap<String, String, S> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).map(|v| Value::String(v.clone()))
    }
}

impl VariableLookup for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Looks variables up in the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentLookup;

impl VariableLookup for EnvironmentLookup {
    fn lookup(&self, name: &str) -> Option<Value> {
        std::env::var(name).ok().map(Value::String)
    }
}

/// Interpolate a value against a lookup.
///
/// Non-string values are returned unchanged. Unknown variables are left in
/// place; a variable that refers back to itself, directly or through other
/// variables, fails with [`InterpolationError::CyclicInterpolation`].
pub fn interpolate<L>(value: &Value, lookup: &L) -> Result<Value, InterpolationError>
where
    L: VariableLookup + ?Sized,
{
    match value {
        Value::String(text) if text.contains(VARIABLE_START) => {
            Interpolator::new(lookup).substitute(text).map(Value::String)
        }
        other => Ok(other.clone()),
    }
}

/// Per-call interpolation context.
///
/// Holds the names currently being resolved; the set lives only as long as
/// the interpolator itself.
pub struct Interpolator<'a, L: ?Sized> {
    lookup: &'a L,
    resolving: Vec<String>,
}

impl<'a, L: VariableLookup + ?Sized> Interpolator<'a, L> {
    /// Create a context reading variables from `lookup`
    pub fn new(lookup: &'a L) -> Self {
        Self {
            lookup,
            resolving: Vec::new(),
        }
    }

    /// Replace every placeholder in `text`, left to right.
    ///
    /// Substituted text is never scanned again; values are fully resolved
    /// before they are inserted.
    pub fn substitute(&mut self, text: &str) -> Result<String, InterpolationError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(VARIABLE_START) {
            let (before, placeholder) = rest.split_at(start);
            let after = &placeholder[VARIABLE_START.len()..];

            // $${name} is the literal text ${name}
            if let Some(literal) = before.strip_suffix(ESCAPE) {
                out.push_str(literal);
                out.push_str(VARIABLE_START);
                rest = after;
                continue;
            }

            out.push_str(before);
            let Some(end) = after.find(VARIABLE_END) else {
                // unterminated
                out.push_str(placeholder);
                rest = "";
                break;
            };

            let name = &after[..end];
            rest = &after[end + VARIABLE_END.len()..];

            match self.resolve(name)? {
                Some(resolved) => out.push_str(&resolved),
                None => {
                    out.push_str(VARIABLE_START);
                    out.push_str(name);
                    out.push_str(VARIABLE_END);
                }
            }
        }

        out.push_str(rest);
        Ok(out)
    }

    fn resolve(&mut self, name: &str) -> Result<Option<String>, InterpolationError> {
        if self.resolving.iter().any(|n| n == name) {
            let chain = format!("{}->{}", self.resolving.join("->"), name);
            debug!(variable = name, chain = %chain, "Cyclic interpolation detected");
            return Err(InterpolationError::CyclicInterpolation {
                variable: name.to_string(),
                chain,
            });
        }

        let Some(value) = self.lookup.lookup(name) else {
            trace!(variable = name, "Unknown variable left in place");
            return Ok(None);
        };
        let text = value.first().map(ToString::to_string).unwrap_or_default();

        self.resolving.push(name.to_string());
        let resolved = self.substitute(&text);
        self.resolving.pop();

        trace!(variable = name, "Resolved placeholder");
        resolved.map(Some)
    }
}
