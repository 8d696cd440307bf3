//! Warning events raised while resolving nodes and classes
//!
//! The logging service is process-wide, so every test here shares one
//! in-memory sink and selects its own events by a unique context value.

use nodematrix_core::config::{IngestPreferences, RegistryPreferences};
use nodematrix_core::logging::{
    self, codes, Code, LogEvent, LogLevel, LoggingService, MemoryLogger,
};
use nodematrix_core::matrix::{ExpansionOptions, MatrixEntry, MatrixExpander, MatrixSpec};
use nodematrix_core::{
    ClassRegistry, FactDocument, InMemoryClassSource, InMemoryFactSource, NodeRegistry,
};
use serde_json::json;
use std::sync::{Arc, OnceLock};

fn memory() -> &'static Arc<MemoryLogger> {
    static MEMORY: OnceLock<Arc<MemoryLogger>> = OnceLock::new();
    MEMORY.get_or_init(|| {
        let memory = Arc::new(MemoryLogger::new());
        logging::init_global_logging_with_service(Arc::new(LoggingService::new(
            memory.clone(),
            LogLevel::Debug,
        )))
        .unwrap();
        memory
    })
}

fn events(code: Code, key: &str, value: &str) -> Vec<LogEvent> {
    memory()
        .get_events_with_code(code)
        .into_iter()
        .filter(|event| event.context.get(key).map(String::as_str) == Some(value))
        .collect()
}

fn nodes(source: InMemoryFactSource, warn_on_missing: bool) -> NodeRegistry {
    NodeRegistry::with_preferences(
        Box::new(source),
        IngestPreferences { strip_keys: vec![] },
        RegistryPreferences { warn_on_missing },
    )
}

fn classes(names: &[&str], warn_on_missing: bool) -> ClassRegistry {
    ClassRegistry::with_preferences(
        Box::new(InMemoryClassSource::new(names.iter().copied())),
        RegistryPreferences { warn_on_missing },
    )
}

#[test]
fn test_malformed_trust_data_warns() {
    memory();
    let source = InMemoryFactSource::new().with_document(
        FactDocument::new("malformed-trust", json!({"kernel": "Linux"})).with_trusted(json!(5)),
    );
    let mut registry = nodes(source, true);

    assert_eq!(registry.register("malformed-trust").unwrap(), 1);
    assert!(registry.get("malformed-trust").unwrap().fact_set().is_empty());

    let warnings = events(codes::facts::MALFORMED_DOCUMENT, "identity", "malformed-trust");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].level, LogLevel::Warning);
    assert!(warnings[0].context.contains_key("error"));
}

#[test]
fn test_unknown_literal_node_warns() {
    memory();
    let mut registry = nodes(InMemoryFactSource::new(), true);

    registry.register("no-such-dump").unwrap();

    let warnings = events(codes::facts::DOCUMENT_NOT_FOUND, "identity", "no-such-dump");
    assert_eq!(warnings.len(), 1);
}

#[test]
fn test_missing_node_lookup_warns() {
    memory();
    let registry = nodes(InMemoryFactSource::new().with_facts("present", json!({})), true);

    assert!(registry.find("absent-node").unwrap().is_missing());
    assert_eq!(events(codes::registry::NODE_NOT_FOUND, "node", "absent-node").len(), 1);
}

#[test]
fn test_missing_class_lookup_warns() {
    memory();
    let registry = classes(&["role::web"], true);

    assert!(registry.find("role::absent").unwrap().is_missing());
    assert_eq!(events(codes::registry::CLASS_NOT_FOUND, "class", "role::absent").len(), 1);
}

#[test]
fn test_missing_lookups_are_silent_when_disabled() {
    memory();
    let node_registry = nodes(InMemoryFactSource::new(), false);
    let class_registry = classes(&[], false);

    assert!(node_registry.find("quiet-node").unwrap().is_missing());
    assert!(class_registry.find("role::quiet").unwrap().is_missing());

    assert!(events(codes::registry::NODE_NOT_FOUND, "node", "quiet-node").is_empty());
    assert!(events(codes::registry::CLASS_NOT_FOUND, "class", "role::quiet").is_empty());
}

#[test]
fn test_overlong_pattern_logs_its_own_code() {
    memory();
    let long = format!("/{}/", "x".repeat(2048));
    let spec = MatrixSpec::new(vec![MatrixEntry::new(["role::web"], [long], ["t"])]);
    let mut node_registry = nodes(InMemoryFactSource::new(), true);
    let mut class_registry = classes(&["role::web"], true);

    let result = MatrixExpander::new().expand(
        &spec,
        &mut node_registry,
        &mut class_registry,
        &ExpansionOptions::default(),
    );
    assert!(result.is_err());

    let errors = memory().get_events_with_code(codes::pattern::PATTERN_TOO_LONG);
    assert!(!errors.is_empty());
    assert!(errors.iter().all(|event| event.level == LogLevel::Error));
}

#[test]
fn test_initialization_is_logged_once() {
    memory();
    let initialized =
        memory().get_events_with_code(codes::success::SYSTEM_INITIALIZATION_COMPLETED);
    assert_eq!(initialized.len(), 1);
}
