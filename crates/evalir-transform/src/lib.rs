/*! Lower Eval expression trees into IR modules.
 *
 * A program is a single root expression. Lowering synthesizes an entry function, walks the tree
 * left to right and appends loads and calls to the entry block, resolving names through a chain of
 * lexical environments seeded with the module's globals and external functions.
 */

pub mod config;
pub mod eval_to_ir;

pub use config::CompilerConfig;
pub use eval_to_ir::{
    transform_eval_to_ir, transform_eval_to_ir_with_config, transform_eval_to_ir_with_filename,
    CompileError, Environment, EvalCompiler, LoweringError,
};
