/*! Lower a parsed program into a module with a synthesized entry function.
 *
 * `EvalCompiler::setup` declares the external functions the special forms need and binds them in
 * the root environment. `compile` opens the entry function, lowers the root expression into its
 * entry block and terminates it with `ret 0`.
 */

mod context;
mod environment;
mod errors;
mod expression_transformer;
mod special_forms;
mod type_resolver;

use crate::config::CompilerConfig;
use context::LoweringContext;
use evalir_core::{Constant, FunctionSignature, Module, Type, Value};
use evalir_parser::Expression;
use expression_transformer::ExpressionTransformer;
use std::rc::Rc;
use tracing::info;

pub use environment::Environment;
pub use errors::{CompileError, LoweringError};

pub struct EvalCompiler {
    ctx: LoweringContext,
}

impl EvalCompiler {
    pub fn setup(config: CompilerConfig) -> Result<Self, LoweringError> {
        let mut compiler = Self {
            ctx: LoweringContext::new(config),
        };
        compiler.declare_external_function("printf", vec![Type::Ptr], Type::INTEGER, true)?;
        Ok(compiler)
    }

    pub fn global_env(&self) -> &Rc<Environment> {
        &self.ctx.root
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.ctx.config
    }

    /// Declare a body-less callable and bind it in the root environment.
    pub fn declare_external_function(
        &mut self,
        name: &str,
        params: Vec<Type>,
        returns: Type,
        is_variadic: bool,
    ) -> Result<Value, LoweringError> {
        let function = self
            .ctx
            .builder
            .declare_external_function(name, params, returns, is_variadic)?;
        Ok(self.ctx.root.define(name, function))
    }

    /// Create or overwrite a storage cell and bind it in the root environment.
    pub fn define_global(&mut self, name: &str, initializer: Constant) -> Result<Value, LoweringError> {
        self.ctx.define_global(name, initializer, None)
    }

    pub fn compile(mut self, program: &Expression) -> Result<Module, LoweringError> {
        let entry = FunctionSignature::new(
            self.ctx.config.entry_function.clone(),
            vec![],
            Type::INTEGER,
            false,
        );
        self.ctx.builder.create_function(entry)?;

        let root = Rc::clone(&self.ctx.root);
        let mut transformer = ExpressionTransformer::new();
        transformer.transform_expression(program, &mut self.ctx, &root)?;

        self.ctx
            .builder
            .build_return(Some(Value::int(0, Type::INTEGER.bits().unwrap_or(32))))?;
        let module = self.ctx.builder.finish()?;

        info!(
            module = %module.name,
            globals = module.globals.len(),
            strings = module.strings.len(),
            "compiled module"
        );
        Ok(module)
    }
}

pub fn transform_eval_to_ir(source: &str) -> Result<Module, CompileError> {
    transform_eval_to_ir_with_config(source, None, &CompilerConfig::default())
}

pub fn transform_eval_to_ir_with_filename(
    source: &str,
    filename: Option<&str>,
) -> Result<Module, CompileError> {
    transform_eval_to_ir_with_config(source, filename, &CompilerConfig::default())
}

pub fn transform_eval_to_ir_with_config(
    source: &str,
    filename: Option<&str>,
    config: &CompilerConfig,
) -> Result<Module, CompileError> {
    let program = evalir_parser::parse(source)?;
    let mut module = EvalCompiler::setup(config.clone())?.compile(&program)?;
    module.record_source(filename, source);
    Ok(module)
}
