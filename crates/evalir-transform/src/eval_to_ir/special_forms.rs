use super::context::{known, LoweringContext};
use super::environment::Environment;
use super::errors::LoweringError;
use super::expression_transformer::{ExpressionTransformer, LowerResult};
use super::type_resolver::TypeResolver;
use evalir_core::Value;
use evalir_parser::{Expression, Span};
use std::rc::Rc;

impl ExpressionTransformer {
    /// `(var name init)`: create or overwrite the module-level storage cell and yield the initializer.
    pub(super) fn transform_var(
        &mut self,
        args: &[Expression],
        ctx: &mut LoweringContext,
        env: &Rc<Environment>,
        span: Option<Span>,
    ) -> LowerResult {
        let [name, init] = args else {
            return Err(LoweringError::malformed(
                "var",
                format!("expected a name and an initializer, found {} operands", args.len()),
                span,
            ));
        };
        let name_span = known(name.span).or(span);
        let Some(name) = name.as_symbol() else {
            return Err(LoweringError::malformed(
                "var",
                format!("variable name must be a symbol, found {}", name.kind_name()),
                name_span,
            ));
        };
        if TypeResolver::boolean_literal(name).is_some() {
            return Err(LoweringError::malformed(
                "var",
                format!("`{}` is a literal and cannot be defined", name),
                name_span,
            ));
        }

        let value = self.transform_expression(init, ctx, env)?;
        let initializer = TypeResolver::initializer(&value, known(init.span).or(span))?;
        ctx.define_global(name, initializer, span)?;

        Ok(value)
    }

    /// `(begin e...)`: lower in order in the same scope, yield the last value.
    pub(super) fn transform_begin(
        &mut self,
        body: &[Expression],
        ctx: &mut LoweringContext,
        env: &Rc<Environment>,
        span: Option<Span>,
    ) -> LowerResult {
        let mut result = None;
        for expr in body {
            result = Some(self.transform_expression(expr, ctx, env)?);
        }
        result.ok_or(LoweringError::EmptyBegin { span })
    }

    /// `(printf fmt arg...)`: call the external print function with positional arguments.
    pub(super) fn transform_printf(
        &mut self,
        args: &[Expression],
        ctx: &mut LoweringContext,
        env: &Rc<Environment>,
        span: Option<Span>,
    ) -> LowerResult {
        if args.is_empty() {
            return Err(LoweringError::malformed(
                "printf",
                "expected a format string",
                span,
            ));
        }

        let callee = match env.lookup("printf").map_err(|e| e.with_span(span))? {
            Value::Function(name) => name,
            other => {
                return Err(LoweringError::TypeMismatch {
                    expected: "function".to_string(),
                    found: format!("{:?}", other),
                    span,
                })
            }
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.transform_expression(arg, ctx, env)?);
        }

        ctx.builder
            .build_call(&callee, values)
            .map_err(|e| LoweringError::from(e).with_span(span))
    }
}
