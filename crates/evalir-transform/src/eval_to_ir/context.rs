use super::environment::Environment;
use super::errors::LoweringError;
use crate::config::CompilerConfig;
use evalir_core::{Constant, ModuleBuilder, Value};
use evalir_parser::Span;
use std::rc::Rc;

/// Mutable state of one compilation: the module under construction, its options and the
/// root environment holding module-level names.
pub struct LoweringContext {
    pub builder: ModuleBuilder,
    pub config: CompilerConfig,
    pub root: Rc<Environment>,
}

impl LoweringContext {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            builder: ModuleBuilder::new(&config.module_name),
            config,
            root: Environment::new_root(),
        }
    }

    /// Create or overwrite the storage cell for `name` and bind it in the root environment,
    /// whatever scope the definition was lowered in.
    pub fn define_global(
        &mut self,
        name: &str,
        initializer: Constant,
        span: Option<Span>,
    ) -> Result<Value, LoweringError> {
        let id = self
            .builder
            .define_global(name, initializer, self.config.redefinition)
            .map_err(|e| LoweringError::from(e).with_span(span))?;
        Ok(self.root.define(name, Value::Global(id)))
    }

    pub fn string_constant(&mut self, text: &str) -> Value {
        self.builder
            .string_constant(text, self.config.intern_strings)
    }
}

/// Position of `span`, or `None` for hand-built expressions.
pub fn known(span: Span) -> Option<Span> {
    (span.line > 0).then_some(span)
}
