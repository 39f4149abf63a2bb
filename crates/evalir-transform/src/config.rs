use anyhow::{Context, Result};
use evalir_core::RedefinitionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for one compilation. Every field has a default, so partial JSON files are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub module_name: String,
    pub entry_function: String,
    /// What a repeated `var` of the same name does.
    pub redefinition: RedefinitionPolicy,
    /// Reuse one constant for identical string literals.
    pub intern_strings: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            module_name: "EvalLLVM".to_string(),
            entry_function: "main".to_string(),
            redefinition: RedefinitionPolicy::Overwrite,
            intern_strings: false,
        }
    }
}

impl CompilerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid compiler configuration")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&json)
    }
}
