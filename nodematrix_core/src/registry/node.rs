//! Simulated host registry

use super::{EntryStore, Found, RegistryEntry};
use crate::config::{IngestPreferences, RegistryPreferences};
use crate::facts::{ingest, FactMap, FactSource, NormalizedFacts};
use crate::logging::codes;
use crate::pattern::{PatternError, Reference};
use crate::{log_debug, log_success, log_warning};
use serde::Serialize;
use serde_json::Value;

/// A simulated machine identity and its resolved fact document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    name: String,
    fact_set: FactMap,
    trusted_set: FactMap,
    trusted_external_set: FactMap,
}

impl Node {
    pub fn new(name: impl Into<String>, facts: NormalizedFacts) -> Self {
        Self {
            name: name.into(),
            fact_set: facts.fact_set,
            trusted_set: facts.trusted_set,
            trusted_external_set: facts.trusted_external_set,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fact_set(&self) -> &FactMap {
        &self.fact_set
    }

    pub fn trusted_set(&self) -> &FactMap {
        &self.trusted_set
    }

    pub fn trusted_external_set(&self) -> &FactMap {
        &self.trusted_external_set
    }

    /// `trusted_set["certname"]` when it is a string
    pub fn certname(&self) -> Option<&str> {
        self.trusted_set.get("certname").and_then(Value::as_str)
    }
}

impl RegistryEntry for Node {
    fn name(&self) -> &str {
        &self.name
    }
}

pub struct NodeRegistry {
    source: Box<dyn FactSource>,
    entries: EntryStore<Node>,
    ingest: IngestPreferences,
    preferences: RegistryPreferences,
}

impl NodeRegistry {
    pub fn new(source: Box<dyn FactSource>) -> Self {
        Self::with_preferences(
            source,
            IngestPreferences::default(),
            RegistryPreferences::default(),
        )
    }

    pub fn with_preferences(
        source: Box<dyn FactSource>,
        ingest: IngestPreferences,
        preferences: RegistryPreferences,
    ) -> Self {
        Self {
            source,
            entries: EntryStore::default(),
            ingest,
            preferences,
        }
    }

    /// Register a literal name or every provider identity matching a pattern.
    /// Returns the number of entries created by this call.
    pub fn register(&mut self, name_or_pattern: &str) -> Result<usize, PatternError> {
        match Reference::parse(name_or_pattern)? {
            Reference::Literal(name) => Ok(usize::from(self.register_literal(&name))),
            reference @ Reference::Pattern { .. } => {
                let matched: Vec<String> = self
                    .provider_identities()
                    .into_iter()
                    .filter(|identity| reference.matches(identity))
                    .collect();

                log_debug!("Pattern matched node identities",
                    "pattern" => &reference,
                    "matched" => matched.len()
                );

                let created = matched
                    .iter()
                    .filter(|identity| self.register_literal(identity))
                    .count();
                Ok(created)
            }
        }
    }

    /// Register every identity the provider knows about
    pub fn register_all(&mut self) -> usize {
        let created = self
            .provider_identities()
            .iter()
            .filter(|identity| self.register_literal(identity))
            .count();

        log_success!(codes::success::NODES_REGISTERED, "Registered nodes from fact source",
            "created" => created,
            "total" => self.len()
        );
        created
    }

    fn register_literal(&mut self, name: &str) -> bool {
        if self.entries.contains(name) {
            return false;
        }

        let facts = ingest(self.source.as_ref(), name, &self.ingest).into_facts();
        self.entries.insert(Node::new(name, facts))
    }

    fn provider_identities(&self) -> Vec<String> {
        match self.source.identities() {
            Ok(identities) => identities,
            Err(error) => {
                log_warning!(code = codes::facts::SOURCE_UNAVAILABLE,
                    "Fact source could not be enumerated",
                    "error" => &error
                );
                Vec::new()
            }
        }
    }

    /// Pattern queries return every matching entry; literal queries return
    /// the entry or `Missing`
    pub fn find(&self, query: &str) -> Result<Found<'_, Node>, PatternError> {
        match Reference::parse(query)? {
            reference @ Reference::Pattern { .. } => Ok(Found::Matches(
                self.entries
                    .all()
                    .iter()
                    .filter(|node| reference.matches(node.name()))
                    .collect(),
            )),
            Reference::Literal(name) => match self.entries.get(&name) {
                Some(node) => Ok(Found::Single(node)),
                None => {
                    if self.preferences.warn_on_missing {
                        log_warning!(code = codes::registry::NODE_NOT_FOUND,
                            "Node not found",
                            "node" => &name
                        );
                    }
                    Ok(Found::Missing)
                }
            },
        }
    }

    /// The registered entry equal to `node`, if it is still registered
    pub fn find_entry(&self, node: &Node) -> Option<&Node> {
        self.entries.get(node.name()).filter(|entry| *entry == node)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    /// Entries in insertion order
    pub fn all(&self) -> &[Node] {
        self.entries.all()
    }

    pub fn names(&self) -> Vec<&str> {
        self.all().iter().map(Node::name).collect()
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.all().is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
