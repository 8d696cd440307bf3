//! Test matrix specification and expansion
//!
//! A specification is a list of `{classes, nodes, tags}` entries whose
//! references may be literals or `/patterns/`. Expansion turns it into a
//! flat, deduplicated, optionally filtered list of [`TestCase`]s.

pub mod expander;
pub mod filter;

use crate::config::compile_time::matrix::{MAX_MATRIX_ENTRIES, MAX_REFERENCES_PER_ENTRY};
use crate::pattern::{PatternError, Reference};
use serde::{Deserialize, Serialize};

pub use expander::{ExpansionOptions, MatrixExpander};
pub use filter::{deep_match, FactFilter};

#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("Malformed test matrix entry {entry}: {reason}")]
    MalformedSpecification { entry: usize, reason: String },

    #[error("Test matrix has {count} entries, limit is {limit}")]
    TooManyEntries { count: usize, limit: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub classes: Vec<String>,
    pub nodes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MatrixEntry {
    pub fn new<C, N, T>(classes: C, nodes: N, tags: T) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
            nodes: nodes.into_iter().map(Into::into).collect(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixSpec {
    #[serde(default)]
    pub entries: Vec<MatrixEntry>,
}

/// Parsed references of one entry
#[derive(Debug, Clone)]
pub(crate) struct ParsedEntry {
    pub classes: Vec<Reference>,
    pub nodes: Vec<Reference>,
    pub tags: Vec<String>,
}

impl MatrixSpec {
    pub fn new(entries: Vec<MatrixEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Structural validation; pattern syntax errors surface here too
    pub fn validate(&self) -> Result<(), MatrixError> {
        self.parse().map(|_| ())
    }

    pub(crate) fn parse(&self) -> Result<Vec<ParsedEntry>, MatrixError> {
        if self.entries.len() > MAX_MATRIX_ENTRIES {
            return Err(MatrixError::TooManyEntries {
                count: self.entries.len(),
                limit: MAX_MATRIX_ENTRIES,
            });
        }

        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                Ok(ParsedEntry {
                    classes: parse_references(index, "classes", &entry.classes)?,
                    nodes: parse_references(index, "nodes", &entry.nodes)?,
                    tags: entry.tags.clone(),
                })
            })
            .collect()
    }
}

fn parse_references(
    entry: usize,
    field: &str,
    references: &[String],
) -> Result<Vec<Reference>, MatrixError> {
    if references.len() > MAX_REFERENCES_PER_ENTRY {
        return Err(MatrixError::MalformedSpecification {
            entry,
            reason: format!(
                "{} lists {} references, limit is {}",
                field,
                references.len(),
                MAX_REFERENCES_PER_ENTRY
            ),
        });
    }

    references
        .iter()
        .map(|reference| {
            if reference.trim().is_empty() {
                return Err(MatrixError::MalformedSpecification {
                    entry,
                    reason: format!("{} contains an empty reference", field),
                });
            }
            Ok(Reference::parse(reference)?)
        })
        .collect()
}

/// One resolved `(class, node, tags)` triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub class_name: String,
    pub node_name: String,
    pub tags: Vec<String>,
}

impl TestCase {
    pub fn key(&self) -> (&str, &str) {
        (&self.class_name, &self.node_name)
    }
}
