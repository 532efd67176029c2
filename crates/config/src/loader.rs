//! Configuration loader implementation

use crate::configuration::Configuration;
use crate::map::MapConfiguration;
use crate::schema::ToolConfig;
use crate::validation::ConfigValidator;
use converter::LIST_DELIMITER;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use std::path::Path;
use types::{ConfigurationError, FileSystemError, Result, Value};

/// Environment prefix of the tool's own settings
pub const TOOL_ENV_PREFIX: &str = "CONFKIT_";

/// Loads YAML documents and environment variables into flat configurations.
///
/// Nested mappings become dotted keys (`server.port`) and sequences become
/// list values. Environment variables with the configured prefix override
/// the document; `__` separates nesting levels (`APP_SERVER__PORT`).
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: Option<String>,
    list_delimiter: Option<char>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            env_prefix: None,
            list_delimiter: Some(LIST_DELIMITER),
        }
    }

    /// Merge environment variables starting with `prefix`
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Delimiter applied to loaded string values, `None` keeps them whole
    pub fn with_list_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.list_delimiter = delimiter;
        self
    }

    /// Load a YAML file
    pub fn load_yaml_file<P: AsRef<Path>>(&self, path: P) -> Result<MapConfiguration> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(FileSystemError::NotFound {
                name: path.display().to_string(),
            }
            .into());
        }

        let config = self.load_figment(Figment::new().merge(Yaml::file(path)))?;
        tracing::info!(path = %path.display(), properties = config.len(), "YAML configuration loaded");
        Ok(config)
    }

    /// Load YAML from a string
    pub fn load_yaml_str(&self, yaml_content: &str) -> Result<MapConfiguration> {
        self.load_figment(Figment::new().merge(Yaml::string(yaml_content)))
    }

    /// Extract any figment, with the environment merged on top
    pub fn load_figment(&self, figment: Figment) -> Result<MapConfiguration> {
        let figment = match &self.env_prefix {
            Some(prefix) => figment.merge(Env::prefixed(prefix).split("__")),
            None => figment,
        };

        let document: serde_json::Value = figment
            .extract()
            .map_err(|e| ConfigurationError::Load(e.to_string()))?;

        let mut config = MapConfiguration::new().with_list_delimiter(self.list_delimiter);
        flatten_document(None, document, &mut config)?;
        Ok(config)
    }

    /// Load the tool settings from an optional YAML file and `CONFKIT_` variables
    pub fn load_tool_config(path: Option<&Path>) -> Result<ToolConfig> {
        let mut figment = Figment::from(Serialized::defaults(ToolConfig::default()));

        if let Some(path) = path {
            if !path.exists() {
                return Err(FileSystemError::NotFound {
                    name: path.display().to_string(),
                }
                .into());
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config: ToolConfig = figment
            .merge(Env::prefixed(TOOL_ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigurationError::Load(e.to_string()))?;

        let report = ConfigValidator::validate(&config);
        for warning in &report.warnings {
            tracing::warn!(field = %warning.field, "{}", warning.message);
        }
        if let Some(error) = report.errors.first() {
            return Err(ConfigurationError::Validation {
                field: error.field.clone(),
                message: error.message.clone(),
            });
        }

        tracing::debug!(summary = %report.summary(), "Tool configuration loaded");
        Ok(config)
    }

    /// Create example configuration file
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let yaml_content = serde_yaml::to_string(&ToolConfig::default())
            .map_err(|e| ConfigurationError::Load(format!("Failed to serialize default configuration: {}", e)))?;

        std::fs::write(path.as_ref(), yaml_content)
            .map_err(|e| FileSystemError::io(path.as_ref().display(), e))?;

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten_document(
    prefix: Option<&str>,
    document: serde_json::Value,
    config: &mut MapConfiguration,
) -> Result<()> {
    match document {
        serde_json::Value::Object(entries) => {
            for (key, value) in entries {
                let key = match prefix {
                    Some(prefix) => format!("{}.{}", prefix, key),
                    None => key,
                };
                flatten_document(Some(&key), value, config)?;
            }
            Ok(())
        }
        other => match (prefix, Value::from_json(other)) {
            (Some(key), Some(value)) => config.add_property(key, value),
            _ => Ok(()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const DOCUMENT: &str = r#"
server:
  host: localhost
  port: 8080
  tls: false
hosts:
  - alpha
  - beta
ratio: 0.75
greeting: "hello, world"
optional: ~
"#;

    #[test]
    fn test_load_from_string() {
        let config = ConfigLoader::new().load_yaml_str(DOCUMENT).unwrap();

        assert_eq!(
            config.get_string("server.host").unwrap().as_deref(),
            Some("localhost")
        );
        assert_eq!(config.get_i32("server.port").unwrap(), Some(8080));
        assert_eq!(config.get_bool("server.tls").unwrap(), Some(false));
        assert_eq!(config.get_f64("ratio").unwrap(), Some(0.75));
        assert_eq!(config.get_list("hosts").unwrap(), vec!["alpha", "beta"]);
        assert_eq!(config.get_list("greeting").unwrap(), vec!["hello", "world"]);
        assert!(!config.contains_key("optional"));
        assert!(!config.contains_key("server"));
    }

    #[test]
    fn test_without_list_splitting() {
        let config = ConfigLoader::new()
            .with_list_delimiter(None)
            .load_yaml_str(DOCUMENT)
            .unwrap();
        assert_eq!(config.get_list("greeting").unwrap(), vec!["hello, world"]);
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("CONFKIT_LOADER_TEST_SERVER__PORT", "9090");
        std::env::set_var("CONFKIT_LOADER_TEST_EXTRA", "added");

        let config = ConfigLoader::new()
            .with_env_prefix("CONFKIT_LOADER_TEST_")
            .load_yaml_str(DOCUMENT)
            .unwrap();

        assert_eq!(config.get_i32("server.port").unwrap(), Some(9090));
        assert_eq!(config.get_string("extra").unwrap().as_deref(), Some("added"));
        assert_eq!(
            config.get_string("server.host").unwrap().as_deref(),
            Some("localhost")
        );
    }

    #[test]
    fn test_load_yaml_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), DOCUMENT).unwrap();

        let config = ConfigLoader::new().load_yaml_file(file.path()).unwrap();
        assert_eq!(config.get_i32("server.port").unwrap(), Some(8080));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::new().load_yaml_file("/nonexistent/confkit.yaml");
        assert!(matches!(
            result,
            Err(ConfigurationError::FileSystem(FileSystemError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = ConfigLoader::new().load_yaml_str("server: [unclosed");
        assert!(matches!(result, Err(ConfigurationError::Load(_))));
    }

    #[test]
    fn test_tool_config_defaults() {
        let config = ConfigLoader::load_tool_config(None).unwrap();
        assert_eq!(config.lists.delimiter, ',');
        assert_eq!(config.http.timeout_seconds, 30);
    }

    #[test]
    fn test_tool_config_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "logging:\n  format: json\nlists:\n  delimiter: ';'\n",
        )
        .unwrap();

        let config = ConfigLoader::load_tool_config(Some(file.path())).unwrap();
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.lists.delimiter, ';');
    }

    #[test]
    fn test_tool_config_validation_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "http:\n  timeout_seconds: 0\n").unwrap();

        let result = ConfigLoader::load_tool_config(Some(file.path()));
        assert!(matches!(
            result,
            Err(ConfigurationError::Validation { field, .. }) if field == "http.timeout_seconds"
        ));
    }

    #[test]
    fn test_create_example() {
        let temp_file = NamedTempFile::new().unwrap();
        ConfigLoader::create_example(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("logging:"));
        assert!(content.contains("lists:"));

        let config = ConfigLoader::load_tool_config(Some(temp_file.path())).unwrap();
        assert_eq!(config.logging.level, "warn");
    }
}
