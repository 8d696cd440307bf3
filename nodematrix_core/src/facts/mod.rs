//! Fact documents and the provider contract the node registry consumes
//!
//! A [`FactSource`] hands out [`FactDocument`]s keyed by an externally derived
//! identity (typically a file basename). Documents are normalized into the
//! three-tier [`NormalizedFacts`] by [`normalize::ingest`].

pub mod normalize;
pub mod trust;

use serde_json::Value;

pub use normalize::{ingest, normalize, IngestOutcome, NormalizedFacts};
pub use trust::{FallbackChain, ShapeError, TrustInputs};

/// Ordered fact mapping
pub type FactMap = serde_json::Map<String, Value>;

/// One document of a fact-source provider
#[derive(Debug, Clone, PartialEq)]
pub struct FactDocument {
    pub identity: String,
    pub facts: Value,
    /// Trust data supplied directly alongside the facts
    pub trusted: Option<Value>,
    /// External trust data supplied directly alongside the facts
    pub trusted_external: Option<Value>,
}

impl FactDocument {
    pub fn new(identity: impl Into<String>, facts: Value) -> Self {
        Self {
            identity: identity.into(),
            facts,
            trusted: None,
            trusted_external: None,
        }
    }

    pub fn with_trusted(mut self, trusted: Value) -> Self {
        self.trusted = Some(trusted);
        self
    }

    pub fn with_trusted_external(mut self, trusted_external: Value) -> Self {
        self.trusted_external = Some(trusted_external);
        self
    }
}

/// Provider errors. Both variants are data-availability problems that the
/// registries absorb into empty results.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Source unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Malformed fact document '{identity}': {reason}")]
    Malformed { identity: String, reason: String },
}

/// External fact-source provider
pub trait FactSource {
    /// Every document, in provider order
    fn documents(&self) -> Result<Vec<FactDocument>, SourceError>;

    /// Every identity, in provider order
    fn identities(&self) -> Result<Vec<String>, SourceError> {
        Ok(self
            .documents()?
            .into_iter()
            .map(|document| document.identity)
            .collect())
    }

    /// The first document whose identity equals `identity`
    fn lookup(&self, identity: &str) -> Result<Option<FactDocument>, SourceError> {
        Ok(self
            .documents()?
            .into_iter()
            .find(|document| document.identity == identity))
    }
}

/// Ordered in-memory provider
#[derive(Debug, Clone, Default)]
pub struct InMemoryFactSource {
    documents: Vec<FactDocument>,
}

impl InMemoryFactSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document: FactDocument) -> Self {
        self.documents.push(document);
        self
    }

    pub fn with_facts(self, identity: impl Into<String>, facts: Value) -> Self {
        self.with_document(FactDocument::new(identity, facts))
    }

    pub fn push(&mut self, document: FactDocument) {
        self.documents.push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FactSource for InMemoryFactSource {
    fn documents(&self) -> Result<Vec<FactDocument>, SourceError> {
        Ok(self.documents.clone())
    }

    fn identities(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.documents.iter().map(|d| d.identity.clone()).collect())
    }

    fn lookup(&self, identity: &str) -> Result<Option<FactDocument>, SourceError> {
        Ok(self
            .documents
            .iter()
            .find(|d| d.identity == identity)
            .cloned())
    }
}
