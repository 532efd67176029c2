//! Tool configuration validation

use crate::schema::ToolConfig;

/// Checks a [`ToolConfig`] for unusable or suspicious settings
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete configuration
    pub fn validate(config: &ToolConfig) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_logging(config, &mut report);
        Self::validate_http(config, &mut report);
        Self::validate_lists(config, &mut report);

        report
    }

    fn validate_logging(config: &ToolConfig, report: &mut ValidationReport) {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            report.add_error(
                "logging.level",
                &format!("Invalid log level: {}. Valid levels: {:?}", config.logging.level, valid_levels),
            );
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&config.logging.format.as_str()) {
            report.add_error(
                "logging.format",
                &format!("Invalid log format: {}. Valid formats: {:?}", config.logging.format, valid_formats),
            );
        }
    }

    fn validate_http(config: &ToolConfig, report: &mut ValidationReport) {
        if config.http.timeout_seconds == 0 {
            report.add_error("http.timeout_seconds", "HTTP timeout cannot be 0");
        } else if config.http.timeout_seconds > 300 {
            report.add_warning("http.timeout_seconds", "HTTP timeout is very long (> 5 minutes)");
        }

        if config.http.user_agent.trim().is_empty() {
            report.add_error("http.user_agent", "User agent cannot be empty");
        }
    }

    fn validate_lists(config: &ToolConfig, report: &mut ValidationReport) {
        let delimiter = config.lists.delimiter;
        if delimiter.is_whitespace() && config.lists.trim {
            report.add_error(
                "lists.delimiter",
                "A whitespace delimiter cannot be combined with trimming",
            );
        } else if delimiter.is_whitespace() {
            report.add_warning("lists.delimiter", "Whitespace delimiter is unusual");
        }

        if delimiter == converter::LIST_ESCAPE {
            report.add_error("lists.delimiter", "The escape character cannot be used as delimiter");
        }
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
