use super::errors::LoweringError;
use evalir_core::{Constant, Type, Value};
use evalir_parser::Span;

pub struct TypeResolver;

impl TypeResolver {
    /// Integer literals are the 32-bit language integer.
    pub fn integer_literal(value: i64, span: Option<Span>) -> Result<Value, LoweringError> {
        let bits = Self::integer_bits();
        if !Constant::fits(value, bits) {
            return Err(LoweringError::IntegerOutOfRange { value, span });
        }
        Ok(Value::int(value, bits))
    }

    pub fn boolean_literal(name: &str) -> Option<Value> {
        match name {
            "true" => Some(Value::bool(true)),
            "false" => Some(Value::bool(false)),
            _ => None,
        }
    }

    /// Storage cells are initialized from constants only.
    pub fn initializer(value: &Value, span: Option<Span>) -> Result<Constant, LoweringError> {
        value.as_constant().cloned().ok_or_else(|| {
            let found = match value {
                Value::Temp(_) => "runtime value".to_string(),
                _ => format!("address {}", Type::Ptr),
            };
            LoweringError::TypeMismatch {
                expected: "constant initializer".to_string(),
                found,
                span,
            }
        })
    }

    /// Turn the two-character sequence `\n` into a newline. Other backslashes are kept.
    pub fn unescape(text: &str) -> String {
        text.replace("\\n", "\n")
    }

    fn integer_bits() -> u16 {
        Type::INTEGER.bits().unwrap_or(32)
    }
}
