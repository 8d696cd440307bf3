//! Fact document normalization
//!
//! Turns one provider document into the node's fact set, trusted set and
//! external trusted set. Missing or malformed documents degrade to three
//! empty mappings so a single bad fixture never aborts a resolution pass.

use super::trust::{value_kind, FallbackChain, TrustInputs};
use super::{FactDocument, FactMap, FactSource, SourceError};
use crate::config::compile_time::facts::ENVIRONMENT_FACT;
use crate::config::IngestPreferences;
use crate::log_warning;
use crate::logging::codes;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedFacts {
    pub fact_set: FactMap,
    pub trusted_set: FactMap,
    pub trusted_external_set: FactMap,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Ingested(NormalizedFacts),
    /// No usable document; every tier is empty
    Empty { reason: String },
}

impl IngestOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, IngestOutcome::Empty { .. })
    }

    pub fn into_facts(self) -> NormalizedFacts {
        match self {
            IngestOutcome::Ingested(facts) => facts,
            IngestOutcome::Empty { .. } => NormalizedFacts::default(),
        }
    }
}

/// Remove keys that belong to the execution environment
pub fn clean_facts(facts: &mut FactMap, preferences: &IngestPreferences) {
    facts.remove(ENVIRONMENT_FACT);
    for key in &preferences.strip_keys {
        facts.remove(key);
    }
}

/// Lift `extensions` entries to the top level; existing top-level keys win
pub fn flatten_extensions(trusted: FactMap) -> FactMap {
    let extensions = match trusted.get("extensions") {
        Some(Value::Object(extensions)) => extensions.clone(),
        _ => return trusted,
    };

    let mut merged = extensions;
    for (key, value) in trusted {
        merged.insert(key, value);
    }
    merged
}

/// Normalize one document
pub fn normalize(
    document: &FactDocument,
    preferences: &IngestPreferences,
) -> Result<NormalizedFacts, SourceError> {
    let malformed = |reason: String| SourceError::Malformed {
        identity: document.identity.clone(),
        reason,
    };

    let mut fact_set = match &document.facts {
        Value::Object(facts) => facts.clone(),
        other => {
            return Err(malformed(format!(
                "facts must be a mapping, found {}",
                value_kind(other)
            )))
        }
    };
    clean_facts(&mut fact_set, preferences);

    let inputs = TrustInputs {
        document,
        facts: &fact_set,
        trusted: None,
    };
    let trusted = FallbackChain::trusted()
        .resolve(&inputs)
        .map_err(|e| malformed(e.to_string()))?;
    let trusted_set = flatten_extensions(trusted.value);

    let inputs = TrustInputs {
        trusted: Some(&trusted_set),
        ..inputs
    };
    let trusted_external_set = FallbackChain::trusted_external()
        .resolve(&inputs)
        .map_err(|e| malformed(e.to_string()))?
        .value;

    Ok(NormalizedFacts {
        fact_set,
        trusted_set,
        trusted_external_set,
    })
}

/// Look up `identity` in `source` and normalize it, absorbing every
/// data-availability failure into an empty outcome with a warning
pub fn ingest(
    source: &dyn FactSource,
    identity: &str,
    preferences: &IngestPreferences,
) -> IngestOutcome {
    let result = source
        .lookup(identity)
        .and_then(|document| match document {
            Some(document) => normalize(&document, preferences).map(Some),
            None => Ok(None),
        });

    match result {
        Ok(Some(facts)) => IngestOutcome::Ingested(facts),
        Ok(None) => {
            log_warning!(code = codes::facts::DOCUMENT_NOT_FOUND,
                "No fact document found, using empty facts",
                "identity" => identity
            );
            IngestOutcome::Empty {
                reason: format!("no fact document for '{}'", identity),
            }
        }
        Err(error) => {
            let code = match error {
                SourceError::Malformed { .. } => codes::facts::MALFORMED_DOCUMENT,
                SourceError::Unavailable { .. } => codes::facts::SOURCE_UNAVAILABLE,
            };
            log_warning!(code = code,
                "Fact document unusable, using empty facts",
                "identity" => identity,
                "error" => &error
            );
            IngestOutcome::Empty {
                reason: error.to_string(),
            }
        }
    }
}
