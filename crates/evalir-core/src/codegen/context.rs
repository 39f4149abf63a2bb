use cranelift::codegen::ir::types as clif_types;
use cranelift_module::{DataId, FuncId};
use std::collections::HashMap;

use crate::{
    types::Type,
    values::{GlobalId, StringId},
    IrError, Result,
};

/// Symbols declared in the object module, keyed by their IR identity.
pub struct CodegenContext {
    pub pointer: clif_types::Type,
    pub strings: HashMap<StringId, DataId>,
    pub globals: HashMap<GlobalId, DataId>,
    pub functions: HashMap<String, FuncId>,
}

impl CodegenContext {
    pub fn new(pointer: clif_types::Type) -> Self {
        Self {
            pointer,
            strings: HashMap::new(),
            globals: HashMap::new(),
            functions: HashMap::new(),
        }
    }

    pub fn get_clif_type(&self, ty: &Type) -> Result<clif_types::Type> {
        ty.to_cranelift(self.pointer).ok_or_else(|| {
            IrError::CraneliftError(format!("Type {} has no machine representation", ty))
        })
    }

    pub fn string_data(&self, id: StringId) -> Result<DataId> {
        self.strings
            .get(&id)
            .copied()
            .ok_or_else(|| IrError::CraneliftError(format!("String {} was not declared", id)))
    }

    pub fn global_data(&self, id: GlobalId) -> Result<DataId> {
        self.globals
            .get(&id)
            .copied()
            .ok_or_else(|| IrError::CraneliftError(format!("Global {} was not declared", id)))
    }

    pub fn function(&self, name: &str) -> Result<FuncId> {
        self.functions
            .get(name)
            .copied()
            .ok_or_else(|| IrError::FunctionNotFound(name.to_string()))
    }
}
