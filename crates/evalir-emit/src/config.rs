use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub use_colors: bool,
    /// Emit the `; ModuleID` / `source_filename` preamble.
    pub include_header: bool,
    pub indent_style: IndentStyle,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: false,
            include_header: true,
            indent_style: IndentStyle::Spaces(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn as_indent(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}
