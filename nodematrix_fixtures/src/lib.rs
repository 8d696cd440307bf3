//! Filesystem providers for nodematrix: fact dumps, module manifests and
//! suite definition files.

pub mod classes;
pub mod error;
pub mod facts;
pub mod suite_file;

pub use classes::ManifestClassSource;
pub use error::LoadError;
pub use facts::DirectoryFactSource;
pub use suite_file::SuiteFile;

use nodematrix_core::config::RuntimeConfig;
use nodematrix_core::context::{Suite, SuiteConfig};
use nodematrix_core::mockgen::MockCodeGenerator;
use nodematrix_core::registry::{ClassRegistry, ClassSource, InMemoryClassSource, NodeRegistry};
use std::path::Path;

/// Suite over a fact directory and, optionally, a module tree. Without a
/// module tree only literal class references resolve.
pub fn build_suite(
    facts: &Path,
    manifests: Option<&Path>,
    config: SuiteConfig,
    runtime: RuntimeConfig,
) -> Suite {
    let classes: Box<dyn ClassSource> = match manifests {
        Some(root) => Box::new(ManifestClassSource::new(root)),
        None => Box::new(InMemoryClassSource::default()),
    };

    Suite::with_generator(
        NodeRegistry::with_preferences(
            Box::new(DirectoryFactSource::new(facts)),
            runtime.ingest,
            runtime.registry.clone(),
        ),
        ClassRegistry::with_preferences(classes, runtime.registry),
        config,
        MockCodeGenerator::with_preferences(runtime.generator),
    )
}
