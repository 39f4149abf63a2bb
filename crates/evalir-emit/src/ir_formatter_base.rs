use evalir_core::{Constant, Function, Module, TempId, Type, Value};
use std::collections::HashMap;

/// Numbers temporaries `%0, %1, ...` in order of definition within one function.
pub struct SSAContext {
    next_value: u32,
    value_map: HashMap<TempId, u32>,
}

impl SSAContext {
    pub fn new() -> Self {
        Self {
            next_value: 0,
            value_map: HashMap::new(),
        }
    }

    pub fn reset(&mut self) {
        self.next_value = 0;
        self.value_map.clear();
    }

    pub fn get_or_allocate(&mut self, temp: TempId) -> u32 {
        if let Some(&v) = self.value_map.get(&temp) {
            v
        } else {
            let v = self.next_value;
            self.value_map.insert(temp, v);
            self.next_value += 1;
            v
        }
    }
}

impl Default for SSAContext {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IRFormatterBase;

impl IRFormatterBase {
    pub fn format_type(ty: &Type) -> String {
        ty.to_string()
    }

    /// Bare constant without its type, as it appears in an initializer or operand.
    pub fn format_constant(constant: &Constant, module: &Module) -> String {
        match constant {
            Constant::Int { value, .. } => value.to_string(),
            Constant::Bool(b) => b.to_string(),
            Constant::Str(id) => match module.string(*id) {
                Some(s) => Self::format_global_name(&s.name),
                None => Self::format_global_name(&id.to_string()),
            },
            Constant::Null => "null".to_string(),
        }
    }

    pub fn format_value(
        value: &Value,
        module: &Module,
        ssa: &mut SSAContext,
    ) -> String {
        match value {
            Value::Constant(c) => Self::format_constant(c, module),
            Value::Temp(id) => format!("%{}", ssa.get_or_allocate(*id)),
            Value::Global(id) => match module.global_by_id(*id) {
                Some(g) => Self::format_global_name(&g.name),
                None => Self::format_global_name(&id.to_string()),
            },
            Value::Function(name) => Self::format_global_name(name),
        }
    }

    /// Operand with its type prefix, e.g. `i32 %0` or `ptr @.str`.
    pub fn format_operand(
        value: &Value,
        module: &Module,
        function: &Function,
        ssa: &mut SSAContext,
    ) -> String {
        let ty = module
            .value_type(function, value)
            .map(|t| Self::format_type(&t))
            .unwrap_or_else(|_| "?".to_string());
        format!("{} {}", ty, Self::format_value(value, module, ssa))
    }

    /// `@name`, or `@"name"` with escapes when the name is not a plain LLVM identifier.
    pub fn format_global_name(name: &str) -> String {
        let plain = name
            .chars()
            .next()
            .is_some_and(|c| !c.is_ascii_digit())
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '$' | '.' | '_'));
        if plain {
            format!("@{}", name)
        } else {
            format!("@\"{}\"", Self::escape_bytes(name.as_bytes()))
        }
    }

    /// Encode bytes as an LLVM `c"..."` literal body.
    pub fn escape_bytes(bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len());
        for &b in bytes {
            if (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\' {
                out.push(b as char);
            } else {
                out.push_str(&format!("\\{:02X}", b));
            }
        }
        out
    }
}
