//! Inkdown structured logging infrastructure
//!
//! Centralized logging configuration with per-module level controls and
//! an environment override, shared by the `ink` binary and plugin tests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Environment variable that overrides the configured filter
pub const LOG_ENV_VAR: &str = "INKDOWN_LOG";

/// Logging configuration for Inkdown tooling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level (applies when module-specific level not set)
    pub global_level: LogLevel,
    /// Per-module log level overrides
    pub module_levels: HashMap<String, LogLevel>,
    /// Whether to include timestamps in log output
    pub include_timestamps: bool,
    /// Whether to include severity levels in log output
    pub include_severity: bool,
    /// Whether to include module targets in log output
    pub include_subsystem: bool,
    /// Whether to use JSON format for structured output
    pub json_format: bool,
    /// Whether to use ANSI colors in output (when not JSON)
    pub use_colors: bool,
}

/// Log levels for Inkdown modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show all logs including trace
    Trace,
    /// Show debug and above
    Debug,
    /// Show info and above (default)
    Info,
    /// Show warnings and above
    Warn,
    /// Show only errors
    Error,
    /// Disable all logging for this module
    Off,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            global_level: LogLevel::Info,
            module_levels: HashMap::new(),
            include_timestamps: true,
            include_severity: true,
            include_subsystem: true,
            json_format: false,
            use_colors: true,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "none" => Ok(LogLevel::Off),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Off => write!(f, "off"),
        }
    }
}

/// Module targets for per-module logging configuration
pub mod modules {
    /// Core module logging target
    pub const CORE: &str = "inkdown_core";
    /// Plugins API module logging target
    pub const PLUGINS_API: &str = "inkdown_plugins_api";
    /// Configuration module logging target
    pub const CONFIG: &str = "inkdown_config";
    /// Devkit module logging target
    pub const DEVKIT: &str = "inkdown_devkit";
    /// CLI binary logging target
    pub const CLI: &str = "ink";
    /// Template plugin logging target
    pub const TEMPLATE_PLUGIN: &str = "my_plugin";

    /// Every target that receives the global level
    pub const ALL: &[&str] = &[CORE, PLUGINS_API, CONFIG, DEVKIT, CLI, TEMPLATE_PLUGIN];
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LoggingConfig) -> crate::Result<()> {
    let env_filter = build_env_filter(config)?;

    let registry = Registry::default().with(env_filter);

    let layer = if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .with_timer(ChronoUtc::rfc_3339())
            .boxed()
    } else if config.include_timestamps {
        fmt::layer()
            .with_target(config.include_subsystem)
            .with_level(config.include_severity)
            .with_ansi(config.use_colors)
            .with_writer(std::io::stderr)
            .with_timer(ChronoUtc::rfc_3339())
            .boxed()
    } else {
        fmt::layer()
            .with_target(config.include_subsystem)
            .with_level(config.include_severity)
            .with_ansi(config.use_colors)
            .with_writer(std::io::stderr)
            .without_time()
            .boxed()
    };

    registry.with(layer).try_init().map_err(|e| {
        crate::InkdownError::Logging(format!("Failed to initialize logging: {}", e))
    })?;

    Ok(())
}

/// Build an environment filter from the logging configuration
pub fn build_env_filter(config: &LoggingConfig) -> crate::Result<EnvFilter> {
    let mut filter = EnvFilter::new("");

    let global_level: LevelFilter = config.global_level.into();
    for module in modules::ALL {
        filter = filter.add_directive(parse_directive(&format!("{}={}", module, global_level))?);
    }

    for (module, level) in &config.module_levels {
        let level: LevelFilter = (*level).into();
        filter = filter.add_directive(parse_directive(&format!("{}={}", module, level))?);
    }

    if let Ok(env_filter) = std::env::var(LOG_ENV_VAR) {
        for part in env_filter.split(',').filter(|p| !p.trim().is_empty()) {
            match part.trim().parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(e) => eprintln!("Ignoring invalid {} directive '{}': {}", LOG_ENV_VAR, part, e),
            }
        }
    }

    Ok(filter)
}

fn parse_directive(directive: &str) -> crate::Result<tracing_subscriber::filter::Directive> {
    directive.parse().map_err(|e| {
        crate::InkdownError::Logging(format!("Invalid filter directive '{}': {}", directive, e))
    })
}

/// Default configuration for interactive `ink` sessions
pub fn cli_config() -> LoggingConfig {
    LoggingConfig {
        global_level: LogLevel::Warn,
        include_timestamps: false,
        include_subsystem: false,
        ..LoggingConfig::default()
    }
}

/// Get default development logging configuration
pub fn dev_config() -> LoggingConfig {
    let mut config = LoggingConfig {
        global_level: LogLevel::Debug,
        ..LoggingConfig::default()
    };

    config.module_levels.insert(modules::DEVKIT.to_string(), LogLevel::Trace);
    config.module_levels.insert(modules::CONFIG.to_string(), LogLevel::Debug);

    config
}

/// Get CI/testing logging configuration
pub fn ci_config() -> LoggingConfig {
    let mut config = LoggingConfig {
        global_level: LogLevel::Info,
        use_colors: false,
        json_format: true,
        ..LoggingConfig::default()
    };

    config.module_levels.insert(modules::DEVKIT.to_string(), LogLevel::Debug);
    config.module_levels.insert(modules::PLUGINS_API.to_string(), LogLevel::Debug);

    config
}
