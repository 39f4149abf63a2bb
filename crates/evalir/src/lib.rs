/*! Compile Eval programs to IR.
 *
 * Single import for the whole pipeline: parse the program text, lower it into a module with a
 * synthesized `main`, render the module as text and persist it. [`exec`] runs all of it the way the
 * command line tool does.
 */

pub use evalir_core as core;
pub use evalir_emit as emit;
pub use evalir_parser as parser;
pub use evalir_transform as transform;

pub use evalir_core::{
    block::{BasicBlock, BlockId, Terminator},
    function::Function,
    instructions::Instruction,
    module::Module,
    types::Type,
    values::Value,
};

pub use evalir_emit::{render, EmitterConfig, TextEmitter};

pub use evalir_parser::{parse, Expression};

pub use evalir_transform::{
    transform_eval_to_ir, transform_eval_to_ir_with_config, CompileError, CompilerConfig,
    EvalCompiler, LoweringError,
};

mod exec;

pub use exec::{exec, exec_to, ExecConfig};
