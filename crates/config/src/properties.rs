//! `.properties` file format

use crate::configuration::Configuration;
use crate::map::MapConfiguration;
use converter::escape;
use filesystem::{FileSystem, Location};
use std::str::FromStr;
use tokio::io::AsyncReadExt;
use types::{ConfigurationError, FileSystemError, Result, Value};

/// Configuration backed by a Java-style `.properties` document.
///
/// Repeated keys and delimited values both produce lists. Escaped list
/// delimiters and doubled backslashes are left for the list splitter, so
/// `key = a\,b` holds the single value `a,b`.
#[derive(Debug, Clone, Default)]
pub struct PropertiesConfiguration {
    store: MapConfiguration,
    location: Option<Location>,
}

impl PropertiesConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.store = self.store.with_list_delimiter(delimiter);
        self
    }

    /// Location the configuration was last loaded from
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Add the properties of a document to this configuration
    pub fn load_from_str(&mut self, text: &str) -> Result<()> {
        let delimiter = self.store.list_delimiter();

        for (line, content) in logical_lines(text) {
            let (raw_key, raw_value) = split_key_value(&content);
            let key = unescape(raw_key, line, |_| false)?;
            let value = unescape(raw_value, line, |c| keep_for_splitter(c, delimiter))?;
            self.store.add_property(&key, Value::String(value))?;
        }
        Ok(())
    }

    /// Resolve `file_name` against `base_path` and load it
    pub async fn load(
        &mut self,
        fs: &dyn FileSystem,
        base_path: Option<&str>,
        file_name: &str,
    ) -> Result<()> {
        let location = fs.locate(base_path, file_name)?;
        let mut stream = fs.read_location(&location).await?;

        let mut text = String::new();
        stream
            .read_to_string(&mut text)
            .await
            .map_err(|e| FileSystemError::io(&location, e))?;

        self.load_from_str(&text)?;
        tracing::info!(
            location = %location,
            properties = self.store.len(),
            "Properties loaded"
        );
        self.location = Some(location);
        Ok(())
    }

    /// Render the configuration as a `.properties` document
    pub fn to_properties_string(&self) -> String {
        let delimiter = self.store.list_delimiter();
        let mut out = String::new();

        for (key, value) in self.store.iter() {
            let items = match value {
                Value::List(items) => items.clone(),
                scalar => vec![scalar.clone()],
            };
            for item in items {
                out.push_str(&escape_key(key));
                out.push_str(" = ");
                out.push_str(&escape_value(&item.to_string(), delimiter));
                out.push('\n');
            }
        }
        out
    }

    /// Write the configuration to `location`
    pub async fn save(&self, fs: &dyn FileSystem, location: &Location) -> Result<()> {
        let text = self.to_properties_string();
        let mut sink = fs.output_stream(location).await?;
        sink.write_all(text.as_bytes()).await?;
        sink.finish().await?;

        tracing::info!(location = %location, bytes = text.len(), "Properties saved");
        Ok(())
    }
}

impl FromStr for PropertiesConfiguration {
    type Err = ConfigurationError;

    fn from_str(text: &str) -> Result<Self> {
        let mut config = Self::new();
        config.load_from_str(text)?;
        Ok(config)
    }
}

impl Configuration for PropertiesConfiguration {
    fn get_property(&self, key: &str) -> Option<Value> {
        self.store.get_property(key)
    }

    fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    fn add_property(&mut self, key: &str, value: Value) -> Result<()> {
        self.store.add_property(key, value)
    }

    fn clear_property(&mut self, key: &str) -> Result<()> {
        self.store.clear_property(key)
    }

    fn clear(&mut self) -> Result<()> {
        self.store.clear()
    }

    fn list_delimiter(&self) -> Option<char> {
        self.store.list_delimiter()
    }
}

/// Join continued lines and drop comments, keeping the starting line number
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim_start();
        let (start, mut content) = match pending.take() {
            Some(open) => open,
            None if is_blank_or_comment(trimmed) => continue,
            None => (idx + 1, String::new()),
        };

        content.push_str(trimmed);
        if is_continued(&content) {
            content.pop();
            pending = Some((start, content));
        } else {
            lines.push((start, content));
        }
    }

    if let Some(open) = pending {
        lines.push(open);
    }
    lines
}

fn is_blank_or_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with('!')
}

/// An odd number of trailing backslashes continues the line
fn is_continued(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn is_separator(c: char) -> bool {
    c == '=' || c == ':' || c.is_whitespace()
}

/// Split a logical line into its raw (still escaped) key and value
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if is_separator(c) {
            key_end = idx;
            break;
        }
    }

    let rest = line[key_end..].trim_start();
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    (&line[..key_end], rest.trim_start())
}

/// Escapes the list splitter still has to see
fn keep_for_splitter(c: char, delimiter: Option<char>) -> bool {
    match delimiter {
        Some(d) if c == d || c == '\\' => true,
        _ => !matches!(c, '\\' | '=' | ':' | '#' | '!') && !c.is_whitespace(),
    }
}

fn unescape(raw: &str, line: usize, keep: impl Fn(char) -> bool) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => {}
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| ConfigurationError::Parse {
                        line,
                        message: format!("malformed \\uXXXX encoding: \\u{}", hex),
                    })?;
                out.push(decoded);
            }
            Some(next) if keep(next) => {
                out.push('\\');
                out.push(next);
            }
            Some(next) => out.push(next),
        }
    }
    Ok(out)
}

fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '\\' | '=' | ':' | '#' | '!' | ' ' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn escape_value(value: &str, delimiter: Option<char>) -> String {
    let escaped = match delimiter {
        Some(d) => escape(value, d),
        None => value.replace('\\', "\\\\"),
    };

    let mut out = String::with_capacity(escaped.len());
    for (idx, c) in escaped.chars().enumerate() {
        match c {
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            ' ' if idx == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}
