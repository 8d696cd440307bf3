//! Attribute filter over node fact documents
//!
//! A filter is a nested mapping of fact path to expected value. A node passes
//! when every top-level filter key matches: the key must exist, nested
//! mappings recurse, anything else compares for exact equality.

use crate::config::compile_time::filter::MAX_FILTER_DEPTH;
use crate::facts::FactMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactFilter(FactMap);

impl FactFilter {
    pub fn new(criteria: FactMap) -> Self {
        Self(criteria)
    }

    /// Build `{"a": {"b": value}}` from `a.b`
    pub fn from_dotted(path: &str, value: Value) -> Self {
        let mut segments: Vec<&str> = path.split('.').collect();
        let last = segments.pop().unwrap_or_default();

        let mut nested = Value::Object(FactMap::from_iter([(last.to_string(), value)]));
        while let Some(segment) = segments.pop() {
            nested = Value::Object(FactMap::from_iter([(segment.to_string(), nested)]));
        }

        match nested {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Deep-merge another filter into this one; `other` wins on leaf conflicts
    pub fn merge(&mut self, other: FactFilter) {
        merge_maps(&mut self.0, other.0);
    }

    pub fn criteria(&self) -> &FactMap {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Conjunction of every top-level criterion
    pub fn matches(&self, facts: &FactMap) -> bool {
        self.0
            .iter()
            .all(|(key, expected)| match_in_map(facts, key, expected, 0))
    }
}

impl From<FactMap> for FactFilter {
    fn from(criteria: FactMap) -> Self {
        Self(criteria)
    }
}

/// Recursive descent match of one criterion against a document
pub fn deep_match(document: &Value, key: &str, expected: &Value) -> bool {
    match document {
        Value::Object(map) => match_in_map(map, key, expected, 0),
        _ => false,
    }
}

fn match_in_map(map: &FactMap, key: &str, expected: &Value, depth: usize) -> bool {
    if depth >= MAX_FILTER_DEPTH {
        return false;
    }

    let Some(actual) = map.get(key) else {
        return false;
    };

    match expected {
        // an empty criterion only requires the key to exist
        Value::Object(criteria) if criteria.is_empty() => true,
        Value::Object(criteria) => match actual {
            Value::Object(inner) => criteria
                .iter()
                .all(|(k, v)| match_in_map(inner, k, v, depth + 1)),
            _ => false,
        },
        _ => actual == expected,
    }
}

fn merge_maps(target: &mut FactMap, source: FactMap) {
    for (key, value) in source {
        match value {
            Value::Object(incoming) => {
                if let Some(Value::Object(existing)) = target.get_mut(&key) {
                    merge_maps(existing, incoming);
                    continue;
                }
                target.insert(key, Value::Object(incoming));
            }
            leaf => {
                target.insert(key, leaf);
            }
        }
    }
}
