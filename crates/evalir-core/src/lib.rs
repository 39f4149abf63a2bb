/*! Core IR types and builders for the Eval compiler.
 *
 * A module holds typed global storage cells, read-only string constants and functions made of
 * basic blocks. The builder keeps a single insertion cursor so lowering can append instructions
 * in program order, and the codegen layer turns a finished module into a native object file.
 */

pub mod block;
pub mod builder;
pub mod codegen;
pub mod function;
pub mod instructions;
pub mod ir_persist;
pub mod module;
pub mod types;
pub mod values;

pub use block::{BasicBlock, BlockId, Terminator};
pub use builder::{ModuleBuilder, RedefinitionPolicy};
pub use function::{Function, FunctionBody, FunctionSignature, Linkage};
pub use instructions::Instruction;
pub use module::{GlobalVariable, Module, ModuleMetadata, StringConstant};
pub use types::{FunctionType, Type};
pub use values::{Constant, GlobalId, StringId, TempId, Value};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("Builder error: {0}")]
    BuilderError(String),
    #[error("Function not found: {0}")]
    FunctionNotFound(String),
    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(String),
    #[error("Cranelift error: {0}")]
    CraneliftError(String),
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests;
