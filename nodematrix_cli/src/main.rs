//! # nodematrix CLI
//!
//! Expands a suite file against a directory of fact dumps and prints the
//! resulting test contexts.

use clap::{Parser, ValueEnum};
use nodematrix_core::config::runtime::LogLevel;
use nodematrix_core::config::{LoggingPreferences, RuntimeConfig};
use nodematrix_core::logging::{self, LogCrateLogger, Logger, LoggingService, StructuredLogger};
use nodematrix_core::matrix::{ExpansionOptions, FactFilter};
use nodematrix_core::log_info;
use nodematrix_fixtures::{build_suite, SuiteFile};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "nodematrix",
    version,
    about = "Expand class/node test matrices against fact fixtures"
)]
struct Args {
    /// Directory of JSON fact dumps
    #[arg(long)]
    facts: PathBuf,

    /// Module tree holding `<module>/manifests/**/*.pp`
    #[arg(long)]
    manifests: Option<PathBuf>,

    /// Suite definition file (TOML)
    #[arg(long)]
    suite: PathBuf,

    /// Fact filter, `path.to.fact=value`; repeatable
    #[arg(long = "filter", value_name = "PATH=VALUE")]
    filters: Vec<String>,

    /// Keep only cases carrying one of these tags; repeatable
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut runtime = RuntimeConfig::default();

    init_logging(&args, &mut runtime)?;
    log_info!("nodematrix starting", "suite" => args.suite.display());

    let suite_file = SuiteFile::load(&args.suite)?;
    let options = expansion_options(&args)?;

    let mut suite = build_suite(
        &args.facts,
        args.manifests.as_deref(),
        suite_file.config,
        runtime,
    );

    let contexts = suite.spec_tests(&suite_file.spec, &options)?;

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&contexts)?),
        Format::Text => {
            for context in &contexts {
                let tags = if context.tags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", context.tags.join(", "))
                };
                println!("{} on {}{}", context.class_name, context.node_name, tags);
            }
            println!("\n{} test context(s)", contexts.len());
        }
    }

    Ok(())
}

fn init_logging(
    args: &Args,
    runtime: &mut RuntimeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.verbose {
        runtime.logging.min_log_level = LogLevel::Debug;
    }
    let level = runtime.logging.min_log_level;

    let filter = match level {
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warning => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env()
        .filter_module("nodematrix", filter)
        .format_timestamp(None)
        .init();

    logging::config::init_runtime_preferences(runtime.logging.clone())?;
    logging::init_global_logging_with_service(Arc::new(LoggingService::new(
        log_sink(&runtime.logging),
        level.to_events_log_level(),
    )))?;
    Ok(())
}

/// JSON lines on stderr when structured logging is requested, else the `log` facade
fn log_sink(preferences: &LoggingPreferences) -> Arc<dyn Logger> {
    if preferences.use_structured_logging {
        Arc::new(StructuredLogger::new(
            preferences.min_log_level.to_events_log_level(),
        ))
    } else {
        Arc::new(LogCrateLogger)
    }
}

fn expansion_options(args: &Args) -> Result<ExpansionOptions, Box<dyn std::error::Error>> {
    let mut options = ExpansionOptions::default();

    if !args.filters.is_empty() {
        let mut filter = FactFilter::default();
        for raw in &args.filters {
            filter.merge(parse_filter(raw)?);
        }
        options = options.with_filter(filter);
    }
    if !args.tags.is_empty() {
        options = options.with_tags(args.tags.iter().cloned());
    }
    Ok(options)
}

/// `os.family=RedHat`; the value is read as JSON when it parses, else as a string
fn parse_filter(raw: &str) -> Result<FactFilter, String> {
    let Some((path, value)) = raw.split_once('=') else {
        return Err(format!("invalid filter '{}': expected PATH=VALUE", raw));
    };
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(format!("invalid filter path '{}'", path));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok(FactFilter::from_dotted(path, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_filter_values() {
        let filter = parse_filter("os.family=RedHat").unwrap();
        assert_eq!(
            Value::Object(filter.criteria().clone()),
            json!({"os": {"family": "RedHat"}})
        );

        let filter = parse_filter("processorcount=2").unwrap();
        assert_eq!(Value::Object(filter.criteria().clone()), json!({"processorcount": 2}));
    }

    #[test]
    fn test_parse_filter_rejects_malformed() {
        assert!(parse_filter("os.family").is_err());
        assert!(parse_filter("os..family=x").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "nodematrix",
            "--facts",
            "f",
            "--suite",
            "s.toml",
            "--filter",
            "a.b=1",
            "--tag",
            "smoke",
            "--format",
            "json",
        ]);
        assert_eq!(args.filters, vec!["a.b=1"]);
        assert_eq!(args.tags, vec!["smoke"]);
        assert!(matches!(args.format, Format::Json));
    }

    #[test]
    fn test_log_sink_follows_preferences() {
        for use_structured_logging in [true, false] {
            let sink = log_sink(&LoggingPreferences {
                use_structured_logging,
                min_log_level: LogLevel::Error,
            });
            sink.log(&logging::LogEvent::info("sink selected"));
        }
    }
}
