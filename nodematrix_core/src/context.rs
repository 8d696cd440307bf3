//! Materialized test contexts
//!
//! A [`Suite`] owns both registries and the suite configuration, and turns a
//! matrix specification into read-only [`TestContext`]s that test runners
//! consume.

use crate::facts::FactMap;
use crate::logging::codes;
use crate::matrix::{ExpansionOptions, FactFilter, MatrixError, MatrixExpander, MatrixSpec};
use crate::mockgen::{HookRegistrar, MockCodeGenerator, MockFunctionTable};
use crate::registry::{ClassRegistry, Node, NodeRegistry};
use crate::{log_info, log_success};
use serde::Serialize;

/// Suite-wide settings carried into every context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteConfig {
    pub mock_functions: MockFunctionTable,
    pub pre_condition: Option<String>,
    pub before_conditions: Vec<String>,
    pub after_conditions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestContext {
    pub class_name: String,
    pub node_name: String,
    pub facts: FactMap,
    pub trusted_facts: FactMap,
    pub trusted_external_data: FactMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certname: Option<String>,
    pub tags: Vec<String>,
    pub generated_code: String,
    pub before_conditions: Vec<String>,
    pub after_conditions: Vec<String>,
}

/// Per-node data for hand-written tests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factset {
    pub name: String,
    pub facts: FactMap,
    pub trusted_facts: FactMap,
    pub trusted_external_data: FactMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certname: Option<String>,
}

impl From<&Node> for Factset {
    fn from(node: &Node) -> Self {
        Self {
            name: node.name().to_string(),
            facts: node.fact_set().clone(),
            trusted_facts: node.trusted_set().clone(),
            trusted_external_data: node.trusted_external_set().clone(),
            certname: node.certname().map(str::to_string),
        }
    }
}

pub struct Suite {
    nodes: NodeRegistry,
    classes: ClassRegistry,
    generator: MockCodeGenerator,
    expander: MatrixExpander,
    config: SuiteConfig,
}

impl Suite {
    pub fn new(nodes: NodeRegistry, classes: ClassRegistry, config: SuiteConfig) -> Self {
        Self::with_generator(nodes, classes, config, MockCodeGenerator::new())
    }

    pub fn with_generator(
        nodes: NodeRegistry,
        classes: ClassRegistry,
        config: SuiteConfig,
        generator: MockCodeGenerator,
    ) -> Self {
        Self {
            nodes,
            classes,
            generator,
            expander: MatrixExpander::new(),
            config,
        }
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn register_all_nodes(&mut self) -> usize {
        self.nodes.register_all()
    }

    pub fn register_all_classes(&mut self) -> usize {
        self.classes.register_all()
    }

    /// Every registered node in registration order, optionally filtered
    pub fn factsets(&self, filter: Option<&FactFilter>) -> Vec<Factset> {
        self.nodes
            .all()
            .iter()
            .filter(|node| filter.map_or(true, |f| f.matches(node.fact_set())))
            .map(Factset::from)
            .collect()
    }

    pub fn spec_tests(
        &mut self,
        spec: &MatrixSpec,
        options: &ExpansionOptions,
    ) -> Result<Vec<TestContext>, MatrixError> {
        let cases = self
            .expander
            .expand(spec, &mut self.nodes, &mut self.classes, options)?;

        let contexts: Vec<TestContext> = cases
            .into_iter()
            .map(|case| {
                let generated_code = self.mock_functions_code(&case.class_name, &case.node_name);
                let node = self.nodes.get(&case.node_name);
                TestContext {
                    facts: node.map(|n| n.fact_set().clone()).unwrap_or_default(),
                    trusted_facts: node.map(|n| n.trusted_set().clone()).unwrap_or_default(),
                    trusted_external_data: node
                        .map(|n| n.trusted_external_set().clone())
                        .unwrap_or_default(),
                    certname: node.and_then(Node::certname).map(str::to_string),
                    class_name: case.class_name,
                    node_name: case.node_name,
                    tags: case.tags,
                    generated_code,
                    before_conditions: self.config.before_conditions.clone(),
                    after_conditions: self.config.after_conditions.clone(),
                }
            })
            .collect();

        log_success!(codes::success::CONTEXTS_MATERIALIZED, "Test contexts materialized",
            "contexts" => contexts.len()
        );
        Ok(contexts)
    }

    pub fn mock_functions_code(&self, class_name: &str, node_name: &str) -> String {
        self.generator.generate(
            class_name,
            node_name,
            &self.config.mock_functions,
            self.config.pre_condition.as_deref(),
        )
    }

    /// Install the mock decoder into a host once; no-op without mocks
    pub fn register_hooks(&self, registrar: &mut dyn HookRegistrar) -> bool {
        self.generator
            .ensure_hook_registered(&self.config.mock_functions, registrar)
    }

    /// Clear both registries before an independent resolution pass
    pub fn reset(&mut self) {
        log_info!("Resetting registries",
            "nodes" => self.nodes.len(),
            "classes" => self.classes.len()
        );
        self.nodes.reset();
        self.classes.reset();
    }
}
