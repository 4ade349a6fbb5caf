//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{InspectConfig, LatticeConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &LatticeConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_inspect_config(&config.inspect)?;
    Ok(())
}

/// Validates logging configuration.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    for target in logging.filters.keys() {
        if target.is_empty() || target.contains(char::is_whitespace) {
            return Err(ConfigError::validation(format!(
                "Invalid log filter target: {target:?}"
            )));
        }
    }

    Ok(())
}

/// Validates inspection configuration.
fn validate_inspect_config(inspect: &InspectConfig) -> ConfigResult<()> {
    if inspect.max_reported_violations == 0 {
        return Err(ConfigError::validation(
            "max_reported_violations must be greater than 0",
        ));
    }
    Ok(())
}
