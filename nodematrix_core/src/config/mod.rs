//! Configuration for the resolver
//!
//! Compile-time limits live in [`constants`]; user preferences read from the
//! environment live in [`runtime`].

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{
    GeneratorPreferences, IngestPreferences, LoggingPreferences, RegistryPreferences,
    RuntimeConfig,
};
