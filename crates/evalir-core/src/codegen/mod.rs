/*! Lower IR modules to native code with Cranelift.
 *
 * String constants become local read-only data, storage cells become exported writable data,
 * external declarations become imports and the synthesized entry function is exported.
 */

pub mod context;
pub mod lowering;
pub mod module;

pub use context::CodegenContext;
pub use lowering::{lower_instruction, lower_terminator, lower_value};
pub use module::ObjectEmitter;
