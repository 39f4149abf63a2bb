use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Constant(Constant),
    /// Result of an instruction in the enclosing function.
    Temp(TempId),
    /// Address of a mutable global storage cell.
    Global(GlobalId),
    /// Direct reference to a declared or defined function.
    Function(String),
}

impl Value {
    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Value::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// The storage cell behind the value, which must be loaded before use.
    pub fn as_global(&self) -> Option<GlobalId> {
        match self {
            Value::Global(id) => Some(*id),
            _ => None,
        }
    }

    pub fn int(value: i64, bits: u16) -> Self {
        Value::Constant(Constant::Int { value, bits })
    }

    pub fn bool(value: bool) -> Self {
        Value::Constant(Constant::Bool(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TempId(pub u32);

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(pub u32);

impl std::fmt::Display for GlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StringId(pub u32);

impl std::fmt::Display for StringId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Int { value: i64, bits: u16 },
    Bool(bool),
    /// Address of a read-only string constant.
    Str(StringId),
    Null,
}

impl Constant {
    pub fn ty(&self) -> Type {
        match self {
            Constant::Int { bits, .. } => Type::Int(*bits),
            Constant::Bool(_) => Type::Bool,
            Constant::Str(_) | Constant::Null => Type::Ptr,
        }
    }

    /// Whether `value` is representable as a signed integer of `bits` width.
    pub fn fits(value: i64, bits: u16) -> bool {
        if bits >= 64 {
            return true;
        }
        let min = -(1i64 << (bits - 1));
        let max = (1i64 << (bits - 1)) - 1;
        (min..=max).contains(&value)
    }
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Int { value, .. } => write!(f, "{}", value),
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Str(id) => write!(f, "{}", id),
            Constant::Null => write!(f, "null"),
        }
    }
}
