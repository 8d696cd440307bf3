//! Node and class registries
//!
//! Both registries keep one entry per distinct name in insertion order,
//! register literals idempotently, expand patterns against their provider,
//! and support an explicit `reset` between independent resolution passes.

pub mod class;
pub mod node;

use std::collections::HashMap;

pub use class::{ClassRegistry, ClassSource, ClassUnit, InMemoryClassSource};
pub use node::{Node, NodeRegistry};

/// Anything stored in a registry is identified by its name
pub trait RegistryEntry {
    fn name(&self) -> &str;
}

/// Result of a registry lookup
#[derive(Debug, PartialEq)]
pub enum Found<'a, T> {
    /// Literal lookup hit
    Single(&'a T),
    /// Pattern lookup, possibly empty
    Matches(Vec<&'a T>),
    /// Literal lookup miss
    Missing,
}

impl<'a, T> Found<'a, T> {
    /// Flatten into a list regardless of lookup kind
    pub fn into_vec(self) -> Vec<&'a T> {
        match self {
            Found::Single(entry) => vec![entry],
            Found::Matches(entries) => entries,
            Found::Missing => Vec::new(),
        }
    }

    pub fn single(self) -> Option<&'a T> {
        match self {
            Found::Single(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Found::Missing)
    }
}

/// Insertion-ordered storage with a name index
#[derive(Debug)]
pub(crate) struct EntryStore<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for EntryStore<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: RegistryEntry> EntryStore<T> {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Insert unless the name is already present; returns whether it was inserted
    pub(crate) fn insert(&mut self, entry: T) -> bool {
        if self.contains(entry.name()) {
            return false;
        }
        self.index
            .insert(entry.name().to_string(), self.entries.len());
        self.entries.push(entry);
        true
    }

    pub(crate) fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub(crate) fn all(&self) -> &[T] {
        &self.entries
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
