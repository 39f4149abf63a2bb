/*! Render IR modules as text.
 *
 * The output follows LLVM assembly conventions: named globals with `@`, numbered temporaries with
 * `%`, one labelled block per basic block. It is what the compiler prints to stdout and saves to
 * the `.ll` output file.
 */

pub mod config;
pub mod emitter;
pub mod ir_formatter_base;
pub mod text_emitter;

pub use config::{EmitterConfig, IndentStyle};
pub use emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
pub use ir_formatter_base::{IRFormatterBase, SSAContext};
pub use text_emitter::TextEmitter;

use evalir_core::Module;

/// Render `module` with the default configuration.
pub fn render(module: &Module) -> anyhow::Result<String> {
    TextEmitter::new(EmitterConfig::default()).emit_to_string(module)
}
