//! Mock code generation
//!
//! Produces the host-language preamble each test context carries: the
//! class/node identity variables, the user pre-condition, and one stub per
//! mocked function returning its configured value through `from_json`.

pub mod hooks;
pub mod literal;

pub use hooks::{DecodeHook, HookRegistrar, HookTable};
pub use literal::{decode_literal, render};

use crate::config::GeneratorPreferences;
use crate::logging::{self, codes, LogEvent};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};

/// Name of the decoder function generated stubs call
pub const DECODE_FUNCTION: &str = "from_json";

#[derive(Debug, thiserror::Error)]
pub enum MockTableError {
    #[error("function '{name}' must be a mapping, found {found}")]
    NotAMapping { name: String, found: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockFunction {
    pub name: String,
    pub returns: Value,
}

/// Mocked functions in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MockFunctionTable {
    functions: Vec<MockFunction>,
}

impl MockFunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace; a replaced function keeps its original position
    pub fn insert(&mut self, name: impl Into<String>, returns: Value) {
        let name = name.into();
        match self.functions.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.returns = returns,
            None => self.functions.push(MockFunction { name, returns }),
        }
    }

    pub fn with(mut self, name: impl Into<String>, returns: Value) -> Self {
        self.insert(name, returns);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.returns)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MockFunction> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Build from `name -> {returns: value}`; a missing `returns` is `null`
    pub fn from_mapping(mapping: Map<String, Value>) -> Result<Self, MockTableError> {
        let mut table = Self::new();
        for (name, params) in mapping {
            let returns = match params {
                Value::Object(mut params) => params.remove("returns").unwrap_or(Value::Null),
                Value::Null => Value::Null,
                other => {
                    return Err(MockTableError::NotAMapping {
                        found: crate::facts::trust::value_kind(&other),
                        name,
                    })
                }
            };
            table.insert(name, returns);
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for MockFunctionTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mapping = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_mapping(mapping).map_err(de::Error::custom)
    }
}

#[derive(Debug)]
pub struct MockCodeGenerator {
    prefix: String,
    hook_registered: AtomicBool,
}

impl Default for MockCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCodeGenerator {
    pub fn new() -> Self {
        Self::with_preferences(GeneratorPreferences::default())
    }

    pub fn with_preferences(preferences: GeneratorPreferences) -> Self {
        Self {
            prefix: preferences.variable_prefix,
            hook_registered: AtomicBool::new(false),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn generate(
        &self,
        class_name: &str,
        node_name: &str,
        functions: &MockFunctionTable,
        pre_condition: Option<&str>,
    ) -> String {
        let mut lines = vec![
            format!("${}_class = '{}'", self.prefix, literal::quote(class_name)),
            format!("${}_node = '{}'", self.prefix, literal::quote(node_name)),
            String::new(),
        ];

        if let Some(pre_condition) = pre_condition {
            lines.push("# Begin user-specified pre_condition".to_string());
            lines.push(pre_condition.trim_end().to_string());
            lines.push("# End user-specified pre_condition".to_string());
            lines.push(String::new());
        }

        if !functions.is_empty() {
            lines.push("# Mocking functions".to_string());
            for function in functions.iter() {
                lines.push(format!(
                    "function {} (*$args) {{ {}('{}') }}",
                    function.name,
                    DECODE_FUNCTION,
                    render(&function.returns)
                ));
            }
        }

        lines.join("\n")
    }

    /// Install the decoder hook once per generator. Returns whether this call
    /// performed the registration.
    pub fn ensure_hook_registered(
        &self,
        functions: &MockFunctionTable,
        registrar: &mut dyn HookRegistrar,
    ) -> bool {
        if functions.is_empty() {
            return false;
        }
        if self
            .hook_registered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        registrar.register_function(DECODE_FUNCTION, decode_literal);
        logging::log_with_context(
            LogEvent::info_with_code(
                codes::mockgen::HOOK_REGISTERED,
                "Registered mock decoder hook",
            ),
            vec![("function", DECODE_FUNCTION.to_string())],
        );
        true
    }

    pub fn is_hook_registered(&self) -> bool {
        self.hook_registered.load(Ordering::Acquire)
    }
}
