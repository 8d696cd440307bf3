//! Host function hooks used by generated mock code

use serde_json::Value;
use std::collections::HashMap;

/// Decoder installed under a function name in the host
pub type DecodeHook = fn(&str) -> Result<Value, serde_json::Error>;

/// Something that can receive custom host functions
pub trait HookRegistrar {
    fn register_function(&mut self, name: &str, hook: DecodeHook);
}

/// In-process registrar; lets callers evaluate registered hooks directly
#[derive(Debug, Default)]
pub struct HookTable {
    hooks: HashMap<String, DecodeHook>,
    registrations: usize,
}

impl HookTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    /// Number of `register_function` calls received
    pub fn registrations(&self) -> usize {
        self.registrations
    }

    /// `None` when no hook is registered under `name`
    pub fn call(&self, name: &str, argument: &str) -> Option<Result<Value, serde_json::Error>> {
        self.hooks.get(name).map(|hook| hook(argument))
    }
}

impl HookRegistrar for HookTable {
    fn register_function(&mut self, name: &str, hook: DecodeHook) {
        self.registrations += 1;
        self.hooks.insert(name.to_string(), hook);
    }
}
