use crate::function::Function;
use crate::types::Type;
use crate::values::{Constant, GlobalId, StringId, Value};
use crate::{IrError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub globals: IndexMap<String, GlobalVariable>,
    pub strings: Vec<StringConstant>,
    pub functions: IndexMap<String, Function>,
    pub metadata: ModuleMetadata,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            globals: IndexMap::new(),
            strings: Vec::new(),
            functions: IndexMap::new(),
            metadata: ModuleMetadata::default(),
        }
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn get_function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.get_mut(name)
    }

    pub fn get_global(&self, name: &str) -> Option<&GlobalVariable> {
        self.globals.get(name)
    }

    pub fn global_by_id(&self, id: GlobalId) -> Option<&GlobalVariable> {
        self.globals.values().find(|g| g.id == id)
    }

    pub fn string(&self, id: StringId) -> Option<&StringConstant> {
        self.strings.iter().find(|s| s.id == id)
    }

    /// Whether `name` is already used by a global, a string constant or a function.
    /// All three share the module's symbol namespace.
    pub fn has_symbol(&self, name: &str) -> bool {
        self.globals.contains_key(name)
            || self.functions.contains_key(name)
            || self.strings.iter().any(|s| s.name == name)
    }

    /// Resolve the IR type of `value` as seen from inside `function`.
    pub fn value_type(&self, function: &Function, value: &Value) -> Result<Type> {
        match value {
            Value::Constant(c) => Ok(c.ty()),
            Value::Global(_) | Value::Function(_) => Ok(Type::Ptr),
            Value::Temp(id) => function
                .body
                .as_ref()
                .and_then(|body| body.values.type_of(*id))
                .cloned()
                .ok_or_else(|| {
                    IrError::BuilderError(format!(
                        "Temp {} is not defined in @{}",
                        id,
                        function.name()
                    ))
                }),
        }
    }

    pub fn defined_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values().filter(|f| !f.is_external())
    }

    pub fn external_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values().filter(|f| f.is_external())
    }

    pub fn record_source(&mut self, file: Option<&str>, source: &str) {
        self.metadata.source_file = file.map(str::to_string);
        self.metadata.source_hash = Some(Sha256::digest(source.as_bytes()).into());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModuleMetadata {
    pub source_file: Option<String>,
    pub source_hash: Option<[u8; 32]>,
}

impl ModuleMetadata {
    pub fn source_hash_hex(&self) -> Option<String> {
        self.source_hash
            .map(|hash| hash.iter().map(|b| format!("{:02x}", b)).collect())
    }
}

/// A named, module-level storage cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub id: GlobalId,
    pub name: String,
    pub ty: Type,
    pub initializer: Constant,
    pub mutable: bool,
    pub alignment: u32,
}

/// Read-only, NUL-terminated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringConstant {
    pub id: StringId,
    pub name: String,
    pub value: String,
}

impl StringConstant {
    pub fn bytes_with_nul(&self) -> Vec<u8> {
        let mut bytes = self.value.as_bytes().to_vec();
        bytes.push(0);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_hash_is_recorded() {
        let mut module = Module::new("EvalLLVM");
        module.record_source(Some("hello.eva"), "(printf \"hi\")");

        assert_eq!(module.metadata.source_file.as_deref(), Some("hello.eva"));
        let hex = module.metadata.source_hash_hex().unwrap();
        assert_eq!(hex.len(), 64);
    }

    #[test]
    fn test_string_bytes_are_nul_terminated() {
        let s = StringConstant {
            id: StringId(0),
            name: ".str".to_string(),
            value: "ok\n".to_string(),
        };
        assert_eq!(s.bytes_with_nul(), b"ok\n\0".to_vec());
    }
}
