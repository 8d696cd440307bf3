//! Suite definition files
//!
//! ```toml
//! pre_condition = "include stdlib"
//! before = ["allow(Puppet).to receive(:lookup)"]
//!
//! [[test]]
//! classes = ["/^role::/"]
//! nodes = ["/CentOS/", "Debian-8"]
//! tags = ["smoke"]
//!
//! [functions.lookup_port]
//! returns = 8080
//! ```

use crate::error::LoadError;
use nodematrix_core::context::SuiteConfig;
use nodematrix_core::matrix::{MatrixEntry, MatrixSpec};
use nodematrix_core::mockgen::MockFunctionTable;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSuite {
    #[serde(default, rename = "test")]
    tests: Vec<MatrixEntry>,
    #[serde(default)]
    functions: MockFunctionTable,
    pre_condition: Option<String>,
    #[serde(default)]
    before: Vec<String>,
    #[serde(default)]
    after: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuiteFile {
    pub spec: MatrixSpec,
    pub config: SuiteConfig,
}

impl SuiteFile {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let raw: RawSuite = toml::from_str(text)?;

        let spec = MatrixSpec::new(raw.tests);
        spec.validate().map_err(|error| LoadError::InvalidSuite {
            reason: error.to_string(),
        })?;

        Ok(Self {
            spec,
            config: SuiteConfig {
                mock_functions: raw.functions,
                pre_condition: raw.pre_condition,
                before_conditions: raw.before,
                after_conditions: raw.after,
            },
        })
    }
}
