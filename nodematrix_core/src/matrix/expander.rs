//! Matrix expansion: populate registries, cross classes with nodes,
//! deduplicate, then filter.

use super::filter::FactFilter;
use super::{MatrixError, MatrixSpec, ParsedEntry, TestCase};
use crate::logging::{self, codes, LogEvent};
use crate::pattern::{PatternError, Reference};
use crate::registry::{ClassRegistry, NodeRegistry};
use crate::{log_debug, log_error, log_success};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ExpansionOptions {
    /// Keep only cases whose node facts satisfy this filter
    pub filter: Option<FactFilter>,
    /// Keep only cases carrying at least one of these tags
    pub tags: Option<Vec<String>>,
}

impl ExpansionOptions {
    pub fn with_filter(mut self, filter: FactFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MatrixExpander;

impl MatrixExpander {
    pub fn new() -> Self {
        Self
    }

    pub fn expand(
        &self,
        spec: &MatrixSpec,
        nodes: &mut NodeRegistry,
        classes: &mut ClassRegistry,
        options: &ExpansionOptions,
    ) -> Result<Vec<TestCase>, MatrixError> {
        let entries = spec.parse().map_err(|error| {
            report(&error);
            error
        })?;

        for entry in &entries {
            for reference in &entry.classes {
                classes.register(reference.as_str())?;
            }
            for reference in &entry.nodes {
                nodes.register(reference.as_str())?;
            }
        }

        let mut cases = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            let resolved = resolve_entry(entry, nodes, classes)?;
            if resolved.is_empty() {
                logging::log_with_context(
                    LogEvent::info_with_code(
                        codes::matrix::EMPTY_MATCH,
                        "Matrix entry matched nothing",
                    ),
                    vec![("entry", index.to_string())],
                );
            }
            cases.extend(resolved);
        }

        let total = cases.len();
        let mut cases = deduplicate(cases);
        log_debug!("Deduplicated test cases", "before" => total, "after" => cases.len());

        if let Some(filter) = options.filter.as_ref().filter(|f| !f.is_empty()) {
            cases.retain(|case| {
                nodes
                    .get(&case.node_name)
                    .is_some_and(|node| filter.matches(node.fact_set()))
            });
        }

        if let Some(selected) = &options.tags {
            cases.retain(|case| case.tags.iter().any(|tag| selected.contains(tag)));
        }

        log_success!(codes::success::MATRIX_EXPANDED, "Test matrix expanded",
            "entries" => entries.len(),
            "cases" => cases.len()
        );
        Ok(cases)
    }
}

fn report(error: &MatrixError) {
    let code = match error {
        MatrixError::Pattern(PatternError::TooLong { .. }) => codes::pattern::PATTERN_TOO_LONG,
        MatrixError::Pattern(_) => codes::pattern::INVALID_EXPRESSION,
        MatrixError::MalformedSpecification { .. } => codes::matrix::MALFORMED_SPECIFICATION,
        MatrixError::TooManyEntries { .. } => codes::matrix::TOO_MANY_ENTRIES,
    };
    log_error!(code, "Test matrix rejected", "error" => error);
}

/// Class-major cross product of one entry
fn resolve_entry(
    entry: &ParsedEntry,
    nodes: &NodeRegistry,
    classes: &ClassRegistry,
) -> Result<Vec<TestCase>, MatrixError> {
    let class_names = resolve_names(&entry.classes, |r| {
        Ok(classes
            .find(r)?
            .into_vec()
            .into_iter()
            .map(|c| c.name().to_string())
            .collect())
    })?;
    let node_names = resolve_names(&entry.nodes, |r| {
        Ok(nodes
            .find(r)?
            .into_vec()
            .into_iter()
            .map(|n| n.name().to_string())
            .collect())
    })?;

    let mut cases = Vec::with_capacity(class_names.len() * node_names.len());
    for class_name in &class_names {
        for node_name in &node_names {
            cases.push(TestCase {
                class_name: class_name.clone(),
                node_name: node_name.clone(),
                tags: entry.tags.clone(),
            });
        }
    }
    Ok(cases)
}

fn resolve_names<F>(references: &[Reference], lookup: F) -> Result<Vec<String>, MatrixError>
where
    F: Fn(&str) -> Result<Vec<String>, MatrixError>,
{
    let mut names = Vec::new();
    for reference in references {
        names.extend(lookup(reference.as_str())?);
    }
    Ok(names)
}

/// First occurrence keeps its position; tags of later duplicates are unioned in
fn deduplicate(cases: Vec<TestCase>) -> Vec<TestCase> {
    let mut unique: Vec<TestCase> = Vec::with_capacity(cases.len());
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for case in cases {
        let key = (case.class_name.clone(), case.node_name.clone());
        match positions.get(&key) {
            Some(&position) => {
                let existing = &mut unique[position];
                for tag in case.tags {
                    if !existing.tags.contains(&tag) {
                        existing.tags.push(tag);
                    }
                }
            }
            None => {
                positions.insert(key, unique.len());
                let mut case = case;
                let mut tags: Vec<String> = Vec::with_capacity(case.tags.len());
                for tag in case.tags.drain(..) {
                    if !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
                case.tags = tags;
                unique.push(case);
            }
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::compile_time::pattern::MAX_PATTERN_LENGTH;
    use crate::facts::InMemoryFactSource;
    use crate::matrix::MatrixEntry;
    use crate::registry::InMemoryClassSource;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn registries() -> (NodeRegistry, ClassRegistry) {
        let facts = InMemoryFactSource::new()
            .with_facts("CentOS-7.0-64", json!({"os": {"family": "RedHat"}}))
            .with_facts("CentOS-6.6-64", json!({"os": {"family": "RedHat"}}))
            .with_facts("Debian-8", json!({"os": {"family": "Debian"}}));
        let classes = InMemoryClassSource::new(["role::web", "role::db", "profile::base"]);

        (
            NodeRegistry::new(Box::new(facts)),
            ClassRegistry::new(Box::new(classes)),
        )
    }

    fn expand(
        spec: &MatrixSpec,
        options: &ExpansionOptions,
    ) -> Result<Vec<TestCase>, MatrixError> {
        let (mut nodes, mut classes) = registries();
        MatrixExpander::new().expand(spec, &mut nodes, &mut classes, options)
    }

    fn keys(cases: &[TestCase]) -> Vec<(&str, &str)> {
        cases.iter().map(TestCase::key).collect()
    }

    #[test]
    fn test_cross_product_is_class_major() {
        let spec = MatrixSpec::new(vec![MatrixEntry::new(
            ["role::web", "role::db"],
            ["/CentOS/"],
            ["t1"],
        )]);

        let cases = expand(&spec, &ExpansionOptions::default()).unwrap();
        assert_eq!(
            keys(&cases),
            vec![
                ("role::web", "CentOS-7.0-64"),
                ("role::web", "CentOS-6.6-64"),
                ("role::db", "CentOS-7.0-64"),
                ("role::db", "CentOS-6.6-64"),
            ]
        );
        assert!(cases.iter().all(|c| c.tags == vec!["t1"]));
    }

    #[test]
    fn test_duplicate_pairs_merge_tags() {
        let spec = MatrixSpec::new(vec![
            MatrixEntry::new(["role::web"], ["Debian-8"], ["t1"]),
            MatrixEntry::new(["/^role::w/"], ["/Debian/", "CentOS-7.0-64"], ["t2", "t1"]),
        ]);

        let cases = expand(&spec, &ExpansionOptions::default()).unwrap();
        assert_eq!(
            keys(&cases),
            vec![("role::web", "Debian-8"), ("role::web", "CentOS-7.0-64")]
        );
        assert_eq!(cases[0].tags, vec!["t1", "t2"]);
        assert_eq!(cases[1].tags, vec!["t2", "t1"]);
    }

    #[test]
    fn test_zero_entries_yield_nothing() {
        let cases = expand(&MatrixSpec::default(), &ExpansionOptions::default()).unwrap();
        assert!(cases.is_empty());
    }

    #[test]
    fn test_unmatched_pattern_contributes_nothing() {
        let spec = MatrixSpec::new(vec![
            MatrixEntry::new(["role::web"], ["/Solaris/"], ["t1"]),
            MatrixEntry::new(["profile::base"], ["Debian-8"], Vec::<String>::new()),
        ]);

        let cases = expand(&spec, &ExpansionOptions::default()).unwrap();
        assert_eq!(keys(&cases), vec![("profile::base", "Debian-8")]);
    }

    #[test]
    fn test_attribute_filter_applies_last() {
        let spec = MatrixSpec::new(vec![MatrixEntry::new(
            ["role::web"],
            ["/CentOS/", "Debian-8"],
            ["t1"],
        )]);
        let debian = FactFilter::from_dotted("os.family", json!("Debian"));
        let options = ExpansionOptions::default().with_filter(debian);

        let cases = expand(&spec, &options).unwrap();
        assert_eq!(keys(&cases), vec![("role::web", "Debian-8")]);
    }

    #[test]
    fn test_tag_selection() {
        let spec = MatrixSpec::new(vec![
            MatrixEntry::new(["role::web"], ["Debian-8"], ["smoke"]),
            MatrixEntry::new(["role::db"], ["Debian-8"], ["full"]),
            MatrixEntry::new(["profile::base"], ["Debian-8"], Vec::<String>::new()),
        ]);

        let cases = expand(&spec, &ExpansionOptions::default().with_tags(["smoke"])).unwrap();
        assert_eq!(keys(&cases), vec![("role::web", "Debian-8")]);
    }

    #[test]
    fn test_unknown_literal_node_still_produces_case() {
        let spec = MatrixSpec::new(vec![MatrixEntry::new(["role::web"], ["ghost"], ["t"])]);

        let (mut nodes, mut classes) = registries();
        let cases = MatrixExpander::new()
            .expand(&spec, &mut nodes, &mut classes, &ExpansionOptions::default())
            .unwrap();

        assert_eq!(keys(&cases), vec![("role::web", "ghost")]);
        assert!(nodes.get("ghost").unwrap().fact_set().is_empty());
    }

    #[test]
    fn test_invalid_pattern_fails_expansion() {
        let spec = MatrixSpec::new(vec![MatrixEntry::new(["/[/"], ["Debian-8"], ["t"])]);

        assert_matches!(
            expand(&spec, &ExpansionOptions::default()),
            Err(MatrixError::Pattern(PatternError::InvalidExpression { .. }))
        );
    }

    #[test]
    fn test_overlong_pattern_fails_expansion() {
        let long = format!("/{}/", "a".repeat(MAX_PATTERN_LENGTH + 1));
        let spec = MatrixSpec::new(vec![MatrixEntry::new(["role::web"], [long], ["t"])]);

        assert_matches!(
            expand(&spec, &ExpansionOptions::default()),
            Err(MatrixError::Pattern(PatternError::TooLong { .. }))
        );
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let spec = MatrixSpec::new(vec![
            MatrixEntry::new(["/^role::/"], ["/-64$/"], ["a"]),
            MatrixEntry::new(["/./"], ["/./"], ["b"]),
        ]);

        let first = expand(&spec, &ExpansionOptions::default()).unwrap();
        let second = expand(&spec, &ExpansionOptions::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 9);
    }
}
