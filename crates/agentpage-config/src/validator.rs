//! Configuration validation.

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

const LONG_GLOBAL_TIMEOUT_MS: u64 = 120_000;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::validate_browser(config, &mut result);
        Self::validate_settle(config, &mut result);
        Self::validate_walker(config, &mut result);
        Self::validate_logging(config, &mut result);
        result
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        if config.browser.debug_port == 0 {
            result.add_error(ValidationError::new("browser.debug_port", "Port cannot be 0"));
        }
        if config.browser.command_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "browser.command_timeout_ms",
                "command_timeout_ms must be greater than 0",
            ));
        }
        if config.browser.viewport_width == 0 || config.browser.viewport_height == 0 {
            result.add_error(ValidationError::new(
                "browser.viewport",
                "Viewport dimensions must be greater than 0",
            ));
        }
    }

    fn validate_settle(config: &Config, result: &mut ValidationResult) {
        let settle = &config.settle;
        for (field, value) in [
            ("settle.dom_idle_ms", settle.dom_idle_ms),
            ("settle.network_idle_ms", settle.network_idle_ms),
            ("settle.global_timeout_ms", settle.global_timeout_ms),
            ("settle.dialog_timeout_ms", settle.dialog_timeout_ms),
        ] {
            if value == 0 {
                result.add_error(ValidationError::new(field, "must be greater than 0"));
            }
        }

        if settle.global_timeout_ms > 0 {
            if settle.dom_idle_ms >= settle.global_timeout_ms {
                result.add_error(ValidationError::new(
                    "settle.dom_idle_ms",
                    "dom_idle_ms must be shorter than global_timeout_ms",
                ));
            }
            if settle.network_idle_ms >= settle.global_timeout_ms {
                result.add_error(ValidationError::new(
                    "settle.network_idle_ms",
                    "network_idle_ms must be shorter than global_timeout_ms",
                ));
            }
        }

        if settle.global_timeout_ms > LONG_GLOBAL_TIMEOUT_MS {
            result.add_warning(ValidationWarning::new(
                "settle.global_timeout_ms",
                "global_timeout_ms is very high (>120s), actions may block for a long time",
            ));
        }
    }

    fn validate_walker(config: &Config, result: &mut ValidationResult) {
        if config.walker.max_nodes == 0 {
            result.add_error(ValidationError::new(
                "walker.max_nodes",
                "max_nodes must be greater than 0",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                "Empty log level, falling back to RUST_LOG or \"info\"",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
