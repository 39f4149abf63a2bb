use cranelift::codegen::ir::types as clif_types;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// One-bit truth value.
    Bool,
    /// Signed integer of the given bit width.
    Int(u16),
    /// Opaque pointer to data or text.
    Ptr,
    Void,
}

impl Type {
    /// The integer type Eval number literals lower to.
    pub const INTEGER: Type = Type::Int(32);

    pub fn to_cranelift(&self, pointer: clif_types::Type) -> Option<clif_types::Type> {
        match self {
            Type::Bool => Some(clif_types::I8),
            Type::Int(8) => Some(clif_types::I8),
            Type::Int(16) => Some(clif_types::I16),
            Type::Int(32) => Some(clif_types::I32),
            Type::Int(64) => Some(clif_types::I64),
            Type::Int(128) => Some(clif_types::I128),
            Type::Ptr => Some(pointer),
            _ => None,
        }
    }

    pub fn size_bytes(&self) -> usize {
        match self {
            Type::Bool => 1,
            Type::Int(bits) => (*bits as usize + 7) / 8,
            Type::Ptr => 8,
            Type::Void => 0,
        }
    }

    /// Default ABI alignment: natural alignment, capped at 8.
    pub fn alignment(&self) -> u32 {
        match self.size_bytes() {
            0 => 1,
            n => n.next_power_of_two().min(8) as u32,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int(_) | Type::Bool)
    }

    pub fn bits(&self) -> Option<u16> {
        match self {
            Type::Bool => Some(1),
            Type::Int(bits) => Some(*bits),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "i1"),
            Type::Int(bits) => write!(f, "i{}", bits),
            Type::Ptr => write!(f, "ptr"),
            Type::Void => write!(f, "void"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub returns: Type,
    pub is_variadic: bool,
}

impl FunctionType {
    pub fn new(params: Vec<Type>, returns: Type, is_variadic: bool) -> Self {
        Self {
            params,
            returns,
            is_variadic,
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params = self
            .params
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>();
        if self.is_variadic {
            params.push("...".to_string());
        }
        write!(f, "{} ({})", self.returns, params.join(", "))
    }
}
