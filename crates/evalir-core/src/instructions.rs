use crate::types::Type;
use crate::values::{GlobalId, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Read the current contents of a global storage cell.
    Load {
        result: Value,
        ty: Type,
        global: GlobalId,
    },
    Call {
        result: Value,
        callee: String,
        args: Vec<Value>,
        ty: Type,
    },
}

impl Instruction {
    pub fn result(&self) -> Option<&Value> {
        match self {
            Instruction::Load { result, .. } | Instruction::Call { result, .. } => Some(result),
        }
    }

    pub fn result_type(&self) -> &Type {
        match self {
            Instruction::Load { ty, .. } | Instruction::Call { ty, .. } => ty,
        }
    }

    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Load { .. } => Vec::new(),
            Instruction::Call { args, .. } => args.iter().collect(),
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Instruction::Call { .. })
    }

    pub fn reads_global(&self, id: GlobalId) -> bool {
        matches!(self, Instruction::Load { global, .. } if *global == id)
    }
}
