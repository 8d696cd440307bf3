//! Configuration unit registry

use super::{EntryStore, Found, RegistryEntry};
use crate::config::RegistryPreferences;
use crate::facts::SourceError;
use crate::logging::codes;
use crate::pattern::{PatternError, Reference};
use crate::{log_debug, log_success, log_warning};
use serde::Serialize;

/// A named, reusable target of validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassUnit {
    name: String,
}

impl ClassUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl RegistryEntry for ClassUnit {
    fn name(&self) -> &str {
        &self.name
    }
}

/// External class-source provider
pub trait ClassSource {
    /// Every known configuration unit identity, in provider order
    fn classes(&self) -> Result<Vec<String>, SourceError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryClassSource {
    classes: Vec<String>,
}

impl InMemoryClassSource {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }
}

impl ClassSource for InMemoryClassSource {
    fn classes(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.classes.clone())
    }
}

pub struct ClassRegistry {
    source: Box<dyn ClassSource>,
    entries: EntryStore<ClassUnit>,
    preferences: RegistryPreferences,
}

impl ClassRegistry {
    pub fn new(source: Box<dyn ClassSource>) -> Self {
        Self::with_preferences(source, RegistryPreferences::default())
    }

    pub fn with_preferences(
        source: Box<dyn ClassSource>,
        preferences: RegistryPreferences,
    ) -> Self {
        Self {
            source,
            entries: EntryStore::default(),
            preferences,
        }
    }

    /// Register a literal name or every provider class matching a pattern.
    /// Returns the number of entries created by this call.
    pub fn register(&mut self, name_or_pattern: &str) -> Result<usize, PatternError> {
        match Reference::parse(name_or_pattern)? {
            Reference::Literal(name) => Ok(usize::from(
                self.entries.insert(ClassUnit::new(name)),
            )),
            reference @ Reference::Pattern { .. } => {
                let matched: Vec<String> = self
                    .provider_classes()
                    .into_iter()
                    .filter(|class| reference.matches(class))
                    .collect();

                log_debug!("Pattern matched classes",
                    "pattern" => &reference,
                    "matched" => matched.len()
                );

                Ok(matched
                    .into_iter()
                    .filter(|class| self.entries.insert(ClassUnit::new(class.as_str())))
                    .count())
            }
        }
    }

    /// Register every class the provider knows about
    pub fn register_all(&mut self) -> usize {
        let created = self
            .provider_classes()
            .into_iter()
            .filter(|class| self.entries.insert(ClassUnit::new(class.as_str())))
            .count();

        log_success!(codes::success::CLASSES_REGISTERED, "Registered classes from class source",
            "created" => created,
            "total" => self.len()
        );
        created
    }

    fn provider_classes(&self) -> Vec<String> {
        self.source.classes().unwrap_or_else(|error| {
            log_warning!(code = codes::facts::SOURCE_UNAVAILABLE,
                "Class source could not be enumerated",
                "error" => &error
            );
            Vec::new()
        })
    }

    pub fn find(&self, query: &str) -> Result<Found<'_, ClassUnit>, PatternError> {
        match Reference::parse(query)? {
            reference @ Reference::Pattern { .. } => Ok(Found::Matches(
                self.entries
                    .all()
                    .iter()
                    .filter(|class| reference.matches(class.name()))
                    .collect(),
            )),
            Reference::Literal(name) => match self.entries.get(&name) {
                Some(class) => Ok(Found::Single(class)),
                None => {
                    if self.preferences.warn_on_missing {
                        log_warning!(code = codes::registry::CLASS_NOT_FOUND,
                            "Class not found",
                            "class" => &name
                        );
                    }
                    Ok(Found::Missing)
                }
            },
        }
    }

    pub fn find_entry(&self, class: &ClassUnit) -> Option<&ClassUnit> {
        self.entries.get(class.name()).filter(|entry| *entry == class)
    }

    pub fn get(&self, name: &str) -> Option<&ClassUnit> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    pub fn all(&self) -> &[ClassUnit] {
        self.entries.all()
    }

    pub fn names(&self) -> Vec<&str> {
        self.all().iter().map(ClassUnit::name).collect()
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
