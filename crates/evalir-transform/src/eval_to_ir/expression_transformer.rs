use super::context::{known, LoweringContext};
use super::environment::Environment;
use super::errors::LoweringError;
use super::type_resolver::TypeResolver;
use evalir_core::Value;
use evalir_parser::{ExprKind, Expression, Span};
use std::rc::Rc;
use tracing::debug;

pub type LowerResult = Result<Value, LoweringError>;

pub struct ExpressionTransformer;

impl ExpressionTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform_expression(
        &mut self,
        expr: &Expression,
        ctx: &mut LoweringContext,
        env: &Rc<Environment>,
    ) -> LowerResult {
        let span = known(expr.span);
        match &expr.kind {
            ExprKind::Number(n) => TypeResolver::integer_literal(*n, span),
            ExprKind::String(text) => Ok(self.transform_string_literal(text, ctx)),
            ExprKind::Symbol(name) => self.transform_symbol(name, ctx, env, span),
            ExprKind::List(items) => self.transform_list(expr, items, ctx, env),
        }
    }

    fn transform_string_literal(&mut self, text: &str, ctx: &mut LoweringContext) -> Value {
        let text = TypeResolver::unescape(text);
        ctx.string_constant(&text)
    }

    fn transform_symbol(
        &mut self,
        name: &str,
        ctx: &mut LoweringContext,
        env: &Rc<Environment>,
        span: Option<Span>,
    ) -> LowerResult {
        if let Some(literal) = TypeResolver::boolean_literal(name) {
            return Ok(literal);
        }

        let value = env.lookup(name).map_err(|e| e.with_span(span))?;
        match value.as_global() {
            Some(id) => ctx
                .builder
                .build_load(id)
                .map_err(|e| LoweringError::from(e).with_span(span)),
            None => Ok(value),
        }
    }

    fn transform_list(
        &mut self,
        expr: &Expression,
        items: &[Expression],
        ctx: &mut LoweringContext,
        env: &Rc<Environment>,
    ) -> LowerResult {
        let span = known(expr.span);
        let Some(head) = items.first() else {
            return Err(LoweringError::UnsupportedForm {
                form: "()".to_string(),
                span,
            });
        };

        let args = &items[1..];
        match head.as_symbol() {
            Some("var") => {
                debug!(form = %expr, "lower var");
                self.transform_var(args, ctx, env, span)
            }
            Some("begin") => {
                debug!(forms = args.len(), "lower begin");
                self.transform_begin(args, ctx, env, span)
            }
            Some("printf") => {
                debug!(args = args.len(), "lower printf");
                self.transform_printf(args, ctx, env, span)
            }
            _ => Err(LoweringError::UnsupportedForm {
                form: expr.to_string(),
                span,
            }),
        }
    }
}

impl Default for ExpressionTransformer {
    fn default() -> Self {
        Self::new()
    }
}
