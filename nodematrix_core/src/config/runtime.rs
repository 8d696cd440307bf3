// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestPreferences {
    /// Fact keys removed on ingestion in addition to `environment`
    pub strip_keys: Vec<String>,
}

impl Default for IngestPreferences {
    fn default() -> Self {
        Self {
            strip_keys: env::var(env_vars::STRIP_FACTS)
                .ok()
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryPreferences {
    /// Whether a literal lookup that finds nothing logs a warning
    pub warn_on_missing: bool,
}

impl Default for RegistryPreferences {
    fn default() -> Self {
        Self {
            warn_on_missing: env::var(env_vars::WARN_ON_MISSING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorPreferences {
    /// Prefix of the `$<prefix>_class` / `$<prefix>_node` variables
    pub variable_prefix: String,
}

impl Default for GeneratorPreferences {
    fn default() -> Self {
        Self {
            variable_prefix: env::var(env_vars::VARIABLE_PREFIX)
                .ok()
                .filter(|v| is_valid_variable_prefix(v))
                .unwrap_or_else(|| "matrix".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Minimum level emitted
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel for compatibility
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Variable prefixes end up in generated code, so only identifier characters are allowed
pub fn is_valid_variable_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first == '_' => chars
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
        _ => false,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub ingest: IngestPreferences,
    pub registry: RegistryPreferences,
    pub generator: GeneratorPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Ingestion
    pub const STRIP_FACTS: &str = "NODEMATRIX_STRIP_FACTS";

    // Registry
    pub const WARN_ON_MISSING: &str = "NODEMATRIX_WARN_ON_MISSING";

    // Generator
    pub const VARIABLE_PREFIX: &str = "NODEMATRIX_VARIABLE_PREFIX";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "NODEMATRIX_LOGGING_USE_STRUCTURED";
    pub const LOGGING_MIN_LEVEL: &str = "NODEMATRIX_LOGGING_MIN_LEVEL";
}
