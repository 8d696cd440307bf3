// Internal modules
pub mod config;
pub mod context;
pub mod facts;
pub mod logging;
pub mod matrix;
pub mod mockgen;
pub mod pattern;
pub mod registry;

// Re-export key types for library consumers
pub use context::{Factset, Suite, SuiteConfig, TestContext};
pub use facts::{FactDocument, FactMap, FactSource, InMemoryFactSource, SourceError};
pub use matrix::{
    ExpansionOptions, FactFilter, MatrixEntry, MatrixError, MatrixExpander, MatrixSpec, TestCase,
};
pub use mockgen::{HookRegistrar, MockCodeGenerator, MockFunctionTable, MockTableError};
pub use pattern::{PatternError, Reference};
pub use registry::{
    ClassRegistry, ClassSource, ClassUnit, Found, InMemoryClassSource, Node, NodeRegistry,
};
