//! Ordered fallback resolution for trust data
//!
//! Each strategy looks in one place and answers with a mapping, "nothing
//! here", or a shape error. The first mapping wins; an exhausted chain yields
//! an empty mapping so downstream lookups never see a missing value.

use super::{FactDocument, FactMap};
use serde_json::Value;

/// A value was present where a mapping was required
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a mapping at '{location}', found {found}")]
pub struct ShapeError {
    pub location: &'static str,
    pub found: &'static str,
}

/// Everything a strategy may consult
#[derive(Debug, Clone, Copy)]
pub struct TrustInputs<'a> {
    pub document: &'a FactDocument,
    /// Facts after cleaning
    pub facts: &'a FactMap,
    /// Already-resolved trusted set, when resolving external data
    pub trusted: Option<&'a FactMap>,
}

pub type StrategyResult = Result<Option<FactMap>, ShapeError>;
pub type Strategy = fn(&TrustInputs<'_>) -> StrategyResult;

/// The winning mapping and the strategy that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: FactMap,
    /// `None` when the chain fell through to the empty default
    pub source: Option<&'static str>,
}

#[derive(Clone, Default)]
pub struct FallbackChain {
    strategies: Vec<(&'static str, Strategy)>,
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.strategy_names()).finish()
    }
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, name: &'static str, strategy: Strategy) -> Self {
        self.strategies.push((name, strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|(name, _)| *name).collect()
    }

    pub fn resolve(&self, inputs: &TrustInputs<'_>) -> Result<Resolved, ShapeError> {
        for (name, strategy) in &self.strategies {
            if let Some(value) = strategy(inputs)? {
                return Ok(Resolved {
                    value,
                    source: Some(*name),
                });
            }
        }

        Ok(Resolved {
            value: FactMap::new(),
            source: None,
        })
    }

    /// document trusted data, then `facts.trusted`
    pub fn trusted() -> Self {
        Self::new()
            .then("document.trusted", document_trusted)
            .then("facts.trusted", facts_trusted)
    }

    /// document external data, then `facts.trusted.external`, then `trusted.external`
    pub fn trusted_external() -> Self {
        Self::new()
            .then("document.trusted_external", document_trusted_external)
            .then("facts.trusted.external", facts_trusted_external)
            .then("trusted.external", resolved_trusted_external)
    }
}

// ============================================================================
// STRATEGIES
// ============================================================================

fn document_trusted(inputs: &TrustInputs<'_>) -> StrategyResult {
    as_mapping(inputs.document.trusted.as_ref(), "document.trusted")
}

fn facts_trusted(inputs: &TrustInputs<'_>) -> StrategyResult {
    as_mapping(inputs.facts.get("trusted"), "facts.trusted")
}

fn document_trusted_external(inputs: &TrustInputs<'_>) -> StrategyResult {
    as_mapping(
        inputs.document.trusted_external.as_ref(),
        "document.trusted_external",
    )
}

fn facts_trusted_external(inputs: &TrustInputs<'_>) -> StrategyResult {
    match as_mapping(inputs.facts.get("trusted"), "facts.trusted")? {
        Some(trusted) => as_mapping(trusted.get("external"), "facts.trusted.external"),
        None => Ok(None),
    }
}

fn resolved_trusted_external(inputs: &TrustInputs<'_>) -> StrategyResult {
    match inputs.trusted {
        Some(trusted) => as_mapping(trusted.get("external"), "trusted.external"),
        None => Ok(None),
    }
}

/// Absent and null both mean "nothing here"
fn as_mapping(value: Option<&Value>, location: &'static str) -> StrategyResult {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(other) => Err(ShapeError {
            location,
            found: value_kind(other),
        }),
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> FactMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be a mapping"),
        }
    }

    #[test]
    fn test_chain_order_is_declared_order() {
        assert_eq!(
            FallbackChain::trusted().strategy_names(),
            vec!["document.trusted", "facts.trusted"]
        );
        assert_eq!(
            FallbackChain::trusted_external().strategy_names(),
            vec![
                "document.trusted_external",
                "facts.trusted.external",
                "trusted.external"
            ]
        );
    }

    #[test]
    fn test_document_trusted_wins_over_nested() {
        let document = FactDocument::new("n", json!({})).with_trusted(json!({"certname": "top"}));
        let facts = map(json!({"trusted": {"certname": "nested"}}));
        let inputs = TrustInputs {
            document: &document,
            facts: &facts,
            trusted: None,
        };

        let resolved = FallbackChain::trusted().resolve(&inputs).unwrap();
        assert_eq!(resolved.value["certname"], "top");
        assert_eq!(resolved.source, Some("document.trusted"));
    }

    #[test]
    fn test_falls_back_to_nested_then_default() {
        let document = FactDocument::new("n", json!({}));
        let nested = map(json!({"trusted": {"certname": "nested"}}));
        let inputs = TrustInputs {
            document: &document,
            facts: &nested,
            trusted: None,
        };
        let resolved = FallbackChain::trusted().resolve(&inputs).unwrap();
        assert_eq!(resolved.value["certname"], "nested");
        assert_eq!(resolved.source, Some("facts.trusted"));

        let bare = FactMap::new();
        let inputs = TrustInputs {
            document: &document,
            facts: &bare,
            trusted: None,
        };
        let resolved = FallbackChain::trusted().resolve(&inputs).unwrap();
        assert!(resolved.value.is_empty());
        assert_eq!(resolved.source, None);
    }

    #[test]
    fn test_null_is_treated_as_absent() {
        let document = FactDocument::new("n", json!({})).with_trusted(Value::Null);
        let facts = map(json!({"trusted": {"certname": "nested"}}));
        let inputs = TrustInputs {
            document: &document,
            facts: &facts,
            trusted: None,
        };

        let resolved = FallbackChain::trusted().resolve(&inputs).unwrap();
        assert_eq!(resolved.source, Some("facts.trusted"));
    }

    #[test]
    fn test_external_derived_from_resolved_trusted() {
        let document = FactDocument::new("n", json!({}));
        let facts = FactMap::new();
        let trusted = map(json!({"external": {"team": "ops"}}));
        let inputs = TrustInputs {
            document: &document,
            facts: &facts,
            trusted: Some(&trusted),
        };

        let resolved = FallbackChain::trusted_external().resolve(&inputs).unwrap();
        assert_eq!(resolved.value["team"], "ops");
        assert_eq!(resolved.source, Some("trusted.external"));
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        let document = FactDocument::new("n", json!({})).with_trusted(json!("not a map"));
        let facts = FactMap::new();
        let inputs = TrustInputs {
            document: &document,
            facts: &facts,
            trusted: None,
        };

        let err = FallbackChain::trusted().resolve(&inputs).unwrap_err();
        assert_eq!(err.location, "document.trusted");
        assert_eq!(err.found, "string");
    }
}
