use crate::block::{BasicBlock, BlockId};
use crate::types::{FunctionType, Type};
use crate::values::{TempId, Value};
use crate::{IrError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub signature: FunctionSignature,
    pub linkage: Linkage,
    /// `None` for declarations resolved outside the module.
    pub body: Option<FunctionBody>,
}

impl Function {
    pub fn declaration(signature: FunctionSignature) -> Self {
        Self {
            signature,
            linkage: Linkage::Import,
            body: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn is_external(&self) -> bool {
        self.body.is_none()
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        self.body.as_ref().map(|body| body.entry_block)
    }

    pub fn instruction_count(&self) -> usize {
        self.body
            .as_ref()
            .map(|body| body.blocks.values().map(|b| b.instructions.len()).sum())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Type>,
    pub returns: Type,
    pub is_variadic: bool,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, params: Vec<Type>, returns: Type, is_variadic: bool) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
            is_variadic,
        }
    }

    pub fn function_type(&self) -> FunctionType {
        FunctionType::new(self.params.clone(), self.returns.clone(), self.is_variadic)
    }

    /// Check positional argument types against the declared parameters.
    /// Arguments past the fixed parameters are only accepted by variadic functions.
    pub fn check_call(&self, arg_types: &[Type]) -> Result<()> {
        if arg_types.len() < self.params.len()
            || (!self.is_variadic && arg_types.len() > self.params.len())
        {
            return Err(IrError::TypeMismatch {
                expected: format!(
                    "{}{} argument(s) for @{}",
                    self.params.len(),
                    if self.is_variadic { " or more" } else { "" },
                    self.name
                ),
                found: format!("{} argument(s)", arg_types.len()),
            });
        }

        for (index, (param, arg)) in self.params.iter().zip(arg_types).enumerate() {
            if param != arg {
                return Err(IrError::TypeMismatch {
                    expected: format!("{} for argument {} of @{}", param, index, self.name),
                    found: arg.to_string(),
                });
            }
        }

        if arg_types.iter().any(|ty| *ty == Type::Void) {
            return Err(IrError::TypeMismatch {
                expected: format!("first-class argument values for @{}", self.name),
                found: "void".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Linkage {
    /// Defined in this module and visible to the linker.
    Export,
    /// Resolved at link or run time outside this module.
    Import,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionBody {
    pub entry_block: BlockId,
    pub blocks: IndexMap<BlockId, BasicBlock>,
    pub values: ValueTable,
    next_block_id: u32,
}

impl FunctionBody {
    pub fn new() -> Self {
        let entry_block = BlockId(0);
        let mut blocks = IndexMap::new();
        blocks.insert(entry_block, BasicBlock::new(entry_block, "entry"));

        Self {
            entry_block,
            blocks,
            values: ValueTable::default(),
            next_block_id: 1,
        }
    }

    pub fn create_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.insert(id, BasicBlock::new(id, name));
        id
    }

    pub fn get_block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn get_block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(&id)
    }

    pub fn entry_block(&self) -> BlockId {
        self.entry_block
    }

    /// Borrow a block together with the temp table so both can be extended at once.
    pub(crate) fn block_and_values(
        &mut self,
        id: BlockId,
    ) -> Option<(&mut BasicBlock, &mut ValueTable)> {
        let block = self.blocks.get_mut(&id)?;
        Some((block, &mut self.values))
    }
}

impl Default for FunctionBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Types of the instruction results of one function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValueTable {
    types: IndexMap<TempId, Type>,
    next_temp: u32,
}

impl ValueTable {
    pub fn fresh(&mut self, ty: Type) -> Value {
        let id = TempId(self.next_temp);
        self.next_temp += 1;
        self.types.insert(id, ty);
        Value::Temp(id)
    }

    pub fn type_of(&self, id: TempId) -> Option<&Type> {
        self.types.get(&id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
