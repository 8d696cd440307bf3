//! Event codes and their classification metadata
//!
//! Single source of truth for every code emitted by the resolver, grouped by
//! the area that raises it.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Metadata attached to a code
#[derive(Debug, Clone)]
pub struct CodeMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
}

impl CodeMetadata {
    const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        description: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            description,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// Pattern compilation codes
pub mod pattern {
    use super::Code;

    pub const INVALID_EXPRESSION: Code = Code::new("E011");
    pub const PATTERN_TOO_LONG: Code = Code::new("E012");
}

/// Fact ingestion codes
pub mod facts {
    use super::Code;

    pub const MALFORMED_DOCUMENT: Code = Code::new("W020");
    pub const DOCUMENT_NOT_FOUND: Code = Code::new("W021");
    pub const SOURCE_UNAVAILABLE: Code = Code::new("W022");
}

/// Registry lookup codes
pub mod registry {
    use super::Code;

    pub const NODE_NOT_FOUND: Code = Code::new("W030");
    pub const CLASS_NOT_FOUND: Code = Code::new("W031");
}

/// Matrix expansion codes
pub mod matrix {
    use super::Code;

    pub const MALFORMED_SPECIFICATION: Code = Code::new("E040");
    pub const TOO_MANY_ENTRIES: Code = Code::new("E041");
    pub const EMPTY_MATCH: Code = Code::new("I040");
}

/// Mock generation codes
pub mod mockgen {
    use super::Code;

    pub const HOOK_REGISTERED: Code = Code::new("I050");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const NODES_REGISTERED: Code = Code::new("I002");
    pub const CLASSES_REGISTERED: Code = Code::new("I003");
    pub const MATRIX_EXPANDED: Code = Code::new("I004");
    pub const CONTEXTS_MATERIALIZED: Code = Code::new("I005");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static CODE_REGISTRY: OnceLock<HashMap<&'static str, CodeMetadata>> = OnceLock::new();

fn get_code_registry() -> &'static HashMap<&'static str, CodeMetadata> {
    CODE_REGISTRY.get_or_init(|| {
        let entries = [
            CodeMetadata::new(
                "E011",
                "Pattern",
                Severity::High,
                false,
                "Pattern expression failed to compile",
            ),
            CodeMetadata::new(
                "E012",
                "Pattern",
                Severity::High,
                false,
                "Pattern expression exceeds the compile-time length limit",
            ),
            CodeMetadata::new(
                "W020",
                "Facts",
                Severity::Medium,
                true,
                "Fact document has an unexpected shape; empty facts substituted",
            ),
            CodeMetadata::new(
                "W021",
                "Facts",
                Severity::Low,
                true,
                "No fact document for this identity; empty facts substituted",
            ),
            CodeMetadata::new(
                "W022",
                "Facts",
                Severity::Medium,
                true,
                "Fact or class source could not be enumerated",
            ),
            CodeMetadata::new(
                "W030",
                "Registry",
                Severity::Low,
                true,
                "Node lookup found no registered entry",
            ),
            CodeMetadata::new(
                "W031",
                "Registry",
                Severity::Low,
                true,
                "Class lookup found no registered entry",
            ),
            CodeMetadata::new(
                "E040",
                "Matrix",
                Severity::High,
                false,
                "Test matrix specification is structurally invalid",
            ),
            CodeMetadata::new(
                "E041",
                "Matrix",
                Severity::High,
                false,
                "Test matrix specification exceeds the entry limit",
            ),
            CodeMetadata::new(
                "I040",
                "Matrix",
                Severity::Low,
                true,
                "Reference matched no entries",
            ),
            CodeMetadata::new(
                "I050",
                "MockGen",
                Severity::Low,
                true,
                "Decode hook registered with the host environment",
            ),
            CodeMetadata::new(
                "I001",
                "Success",
                Severity::Low,
                true,
                "Logging system initialized",
            ),
            CodeMetadata::new("I002", "Success", Severity::Low, true, "Nodes registered"),
            CodeMetadata::new("I003", "Success", Severity::Low, true, "Classes registered"),
            CodeMetadata::new("I004", "Success", Severity::Low, true, "Matrix expanded"),
            CodeMetadata::new(
                "I005",
                "Success",
                Severity::Low,
                true,
                "Test contexts materialized",
            ),
        ];

        entries.into_iter().map(|meta| (meta.code, meta)).collect()
    })
}

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

pub fn get_code_metadata(code: &str) -> Option<&'static CodeMetadata> {
    get_code_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_code_metadata(code)
        .map(|meta| meta.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_code_metadata(code)
        .map(|meta| meta.recoverable)
        .unwrap_or(true)
}

pub fn get_description(code: &str) -> &'static str {
    get_code_metadata(code)
        .map(|meta| meta.description)
        .unwrap_or("Unknown code")
}

pub fn get_category(code: &str) -> &'static str {
    get_code_metadata(code)
        .map(|meta| meta.category)
        .unwrap_or("General")
}
