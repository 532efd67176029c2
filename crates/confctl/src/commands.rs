//! Command implementations

use crate::Command;
use anyhow::{bail, Context, Result};
use config::{
    CompositeConfiguration, ConfigLoader, Configuration, EnvironmentConfiguration,
    PropertiesConfiguration, ToolConfig,
};
use converter::{escape_with, split_with_escape, LIST_ESCAPE};
use filesystem::{DefaultFileSystem, FileSystem};
use tracing::info;
use types::Value;

/// Keyword selecting the process environment as source
const ENV_SOURCE: &str = "env";

pub async fn run(command: Command, settings: &ToolConfig, base: Option<&str>) -> Result<()> {
    let fs = DefaultFileSystem::new(&settings.http).context("Failed to create file system")?;
    let delimiter = settings.lists.delimiter;

    match command {
        Command::Get { source, key } => {
            let config = open_source(&fs, &source, base, delimiter).await?;
            if !config.contains_key(&key) {
                bail!("Key {} not found in {}", key, source);
            }
            for value in config.get_list(&key)? {
                println!("{}", value);
            }
        }
        Command::List { source } => {
            let config = open_source(&fs, &source, base, delimiter).await?;
            for line in render_entries(config.as_ref(), delimiter)? {
                println!("{}", line);
            }
        }
        Command::Split {
            value,
            delimiter: custom,
            no_trim,
        } => {
            let trim = settings.lists.trim && !no_trim;
            for token in split_with_escape(Some(&value), custom.unwrap_or(delimiter), LIST_ESCAPE, trim) {
                println!("{}", token);
            }
        }
        Command::Escape {
            value,
            delimiter: custom,
        } => {
            println!("{}", escape_with(&value, custom.unwrap_or(delimiter), LIST_ESCAPE));
        }
        Command::Interpolate { template, sources } => {
            let mut composite = CompositeConfiguration::new();
            for source in &sources {
                composite.add_configuration(open_source(&fs, source, base, delimiter).await?);
            }
            let resolved = composite
                .interpolate(&Value::from(template))
                .context("Interpolation failed")?;
            println!("{}", resolved);
        }
        Command::Copy { source, target } => {
            let config = open_source(&fs, &source, base, delimiter).await?;
            let copy = to_properties(config.as_ref(), delimiter)?;

            let location = fs
                .locate(base, &target)
                .with_context(|| format!("Cannot resolve target {}", target))?;
            copy.save(&fs, &location)
                .await
                .with_context(|| format!("Failed to write {}", location))?;
            info!(source = %source, target = %location, keys = copy.keys().len(), "Configuration copied");
        }
    }

    Ok(())
}

/// Open `env`, a YAML document or a properties file/URL
async fn open_source(
    fs: &dyn FileSystem,
    source: &str,
    base: Option<&str>,
    delimiter: char,
) -> Result<Box<dyn Configuration>> {
    if source == ENV_SOURCE {
        return Ok(Box::new(EnvironmentConfiguration::new()));
    }

    if source.ends_with(".yaml") || source.ends_with(".yml") {
        let path = match base {
            Some(base) => std::path::Path::new(base).join(source),
            None => source.into(),
        };
        let config = ConfigLoader::new()
            .with_list_delimiter(Some(delimiter))
            .load_yaml_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        return Ok(Box::new(config));
    }

    let mut config = PropertiesConfiguration::new().with_list_delimiter(Some(delimiter));
    config
        .load(fs, base, source)
        .await
        .with_context(|| format!("Failed to load {}", source))?;
    Ok(Box::new(config))
}

/// `key = value` lines with list elements re-joined by the delimiter
fn render_entries(config: &dyn Configuration, delimiter: char) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for key in config.keys() {
        let values = config.get_list(&key)?;
        let joined = values
            .iter()
            .map(|v| escape_with(v, delimiter, LIST_ESCAPE))
            .collect::<Vec<_>>()
            .join(&format!("{} ", delimiter));
        lines.push(format!("{} = {}", key, joined));
    }
    Ok(lines)
}

/// Copy every raw value into a properties configuration
fn to_properties(config: &dyn Configuration, delimiter: char) -> Result<PropertiesConfiguration> {
    let mut copy = PropertiesConfiguration::new().with_list_delimiter(Some(delimiter));
    for key in config.keys() {
        let Some(value) = config.get_property(&key) else {
            continue;
        };
        let items = match value {
            Value::List(items) => items,
            scalar => vec![scalar],
        };
        for item in items {
            // keep the element whole when it is split again on add
            let item = match item {
                Value::String(s) => Value::String(escape_with(&s, delimiter, LIST_ESCAPE)),
                other => other,
            };
            copy.add_property(&key, item)?;
        }
    }
    Ok(copy)
}
