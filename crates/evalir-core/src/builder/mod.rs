/*! Incremental construction of IR modules.
 *
 * Instructions are appended at a single insertion cursor and can never be taken back, so the
 * builder type-checks operands before anything is placed in a block and refuses to append
 * past a terminator.
 */

pub mod block_builder;
pub mod ir_context;
pub mod module_builder;

pub use block_builder::BlockBuilder;
pub use ir_context::{CursorPosition, IRContext};
pub use module_builder::{ModuleBuilder, RedefinitionPolicy};
