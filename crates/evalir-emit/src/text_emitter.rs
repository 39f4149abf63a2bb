use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter, Highlight};
use crate::ir_formatter_base::{IRFormatterBase, SSAContext};
use evalir_core::{
    BasicBlock, Function, GlobalVariable, Instruction, Module, StringConstant, Terminator, Type,
};
use std::io::Write;

pub struct TextEmitter {
    config: EmitterConfig,
}

impl TextEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    fn emit_header<W: Write>(&self, module: &Module, writer: &mut W, ctx: &EmitContext) -> EmitResult {
        EmitHelper::write_comment(writer, ctx, &format!("ModuleID = '{}'", module.name))?;
        let source = module
            .metadata
            .source_file
            .as_deref()
            .unwrap_or(&module.name);
        EmitHelper::write_line(writer, ctx, &format!("source_filename = \"{}\"", source))?;
        if let Some(hash) = module.metadata.source_hash_hex() {
            EmitHelper::write_comment(writer, ctx, &format!("source sha256 = {}", hash))?;
        }
        Ok(())
    }

    fn format_global(global: &GlobalVariable, module: &Module) -> String {
        format!(
            "{} = global {} {}, align {}",
            IRFormatterBase::format_global_name(&global.name),
            global.ty,
            IRFormatterBase::format_constant(&global.initializer, module),
            global.alignment
        )
    }

    fn format_string(string: &StringConstant) -> String {
        let bytes = string.bytes_with_nul();
        format!(
            "{} = private unnamed_addr constant [{} x i8] c\"{}\", align 1",
            IRFormatterBase::format_global_name(&string.name),
            bytes.len(),
            IRFormatterBase::escape_bytes(&bytes)
        )
    }

    fn format_prototype(function: &Function) -> String {
        let sig = &function.signature;
        let mut params: Vec<String> = sig.params.iter().map(IRFormatterBase::format_type).collect();
        if sig.is_variadic {
            params.push("...".to_string());
        }
        format!(
            "{} {}({})",
            sig.returns,
            IRFormatterBase::format_global_name(&sig.name),
            params.join(", ")
        )
    }

    fn emit_function<W: Write>(
        &self,
        module: &Module,
        function: &Function,
        writer: &mut W,
        ctx: &mut EmitContext,
    ) -> EmitResult {
        let Some(body) = &function.body else {
            return EmitHelper::write_colored_line(
                writer,
                ctx,
                &format!("declare {}", Self::format_prototype(function)),
                Highlight::Keyword,
            );
        };

        let mut ssa = SSAContext::new();
        let header = format!("define {}", Self::format_prototype(function));
        EmitHelper::write_block(writer, ctx, &header, |w, c| {
            for (index, block) in body.blocks.values().enumerate() {
                if index > 0 {
                    writeln!(w)?;
                }
                self.emit_block(module, function, block, &mut ssa, w, c)?;
            }
            Ok(())
        })
    }

    fn emit_block<W: Write>(
        &self,
        module: &Module,
        function: &Function,
        block: &BasicBlock,
        ssa: &mut SSAContext,
        writer: &mut W,
        ctx: &mut EmitContext,
    ) -> EmitResult {
        EmitHelper::write_colored_line(writer, ctx, &format!("{}:", block.name), Highlight::Label)?;
        ctx.indent();
        for inst in &block.instructions {
            let line = Self::format_instruction(inst, module, function, ssa);
            EmitHelper::write_line(writer, ctx, &line)?;
        }
        let term = Self::format_terminator(&block.terminator, module, function, ssa);
        EmitHelper::write_line(writer, ctx, &term)?;
        ctx.dedent();
        Ok(())
    }

    pub fn format_instruction(
        inst: &Instruction,
        module: &Module,
        function: &Function,
        ssa: &mut SSAContext,
    ) -> String {
        match inst {
            Instruction::Load { result, ty, global } => {
                let name = module
                    .global_by_id(*global)
                    .map(|g| g.name.clone())
                    .unwrap_or_else(|| global.to_string());
                format!(
                    "{} = load {}, ptr {}, align {}",
                    IRFormatterBase::format_value(result, module, ssa),
                    ty,
                    IRFormatterBase::format_global_name(&name),
                    ty.alignment()
                )
            }
            Instruction::Call {
                result,
                callee,
                args,
                ty,
            } => {
                let args = args
                    .iter()
                    .map(|arg| IRFormatterBase::format_operand(arg, module, function, ssa))
                    .collect::<Vec<_>>()
                    .join(", ");

                // Variadic callees spell out the function type at the call site.
                let callee_ty = match module.get_function(callee) {
                    Some(target) if target.signature.is_variadic => {
                        target.signature.function_type().to_string()
                    }
                    _ => ty.to_string(),
                };
                let call = format!(
                    "call {} {}({})",
                    callee_ty,
                    IRFormatterBase::format_global_name(callee),
                    args
                );

                if *ty == Type::Void {
                    call
                } else {
                    format!("{} = {}", IRFormatterBase::format_value(result, module, ssa), call)
                }
            }
        }
    }

    fn format_terminator(
        term: &Terminator,
        module: &Module,
        function: &Function,
        ssa: &mut SSAContext,
    ) -> String {
        match term {
            Terminator::Return(Some(value)) => format!(
                "ret {}",
                IRFormatterBase::format_operand(value, module, function, ssa)
            ),
            Terminator::Return(None) => "ret void".to_string(),
            Terminator::Invalid => "; missing terminator".to_string(),
        }
    }
}

impl Emitter for TextEmitter {
    type Item = Module;

    fn context(&self) -> EmitContext {
        EmitContext {
            indent_level: 0,
            indent_chars: self.config.indent_style.as_indent(),
            use_colors: self.config.use_colors,
        }
    }

    fn emit<W: Write>(&self, module: &Module, writer: &mut W, ctx: &mut EmitContext) -> EmitResult {
        let mut sections = 0;
        let mut separate = |w: &mut W| -> EmitResult {
            if sections > 0 {
                writeln!(w)?;
            }
            sections += 1;
            Ok(())
        };

        if self.config.include_header {
            separate(writer)?;
            self.emit_header(module, writer, ctx)?;
        }

        if !module.strings.is_empty() {
            separate(writer)?;
            for string in &module.strings {
                EmitHelper::write_colored_line(
                    writer,
                    ctx,
                    &Self::format_string(string),
                    Highlight::Global,
                )?;
            }
        }

        if !module.globals.is_empty() {
            separate(writer)?;
            for global in module.globals.values() {
                EmitHelper::write_colored_line(
                    writer,
                    ctx,
                    &Self::format_global(global, module),
                    Highlight::Global,
                )?;
            }
        }

        for function in module.functions.values() {
            separate(writer)?;
            self.emit_function(module, function, writer, ctx)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalir_core::{Constant, FunctionSignature, ModuleBuilder, RedefinitionPolicy, Value};
    use pretty_assertions::assert_eq;

    fn emitter(include_header: bool) -> TextEmitter {
        TextEmitter::new(EmitterConfig {
            include_header,
            ..EmitterConfig::default()
        })
    }

    fn version_module() -> Module {
        let mut builder = ModuleBuilder::new("EvalLLVM");
        builder
            .declare_external_function("printf", vec![Type::Ptr], Type::INTEGER, true)
            .unwrap();
        let version = builder
            .define_global(
                "VERSION",
                Constant::Int {
                    value: 45,
                    bits: 32,
                },
                RedefinitionPolicy::Overwrite,
            )
            .unwrap();
        builder
            .create_function(FunctionSignature::new("main", vec![], Type::INTEGER, false))
            .unwrap();
        let fmt = builder.string_constant("Version: %d\n", false);
        let loaded = builder.build_load(version).unwrap();
        builder.build_call("printf", vec![fmt, loaded]).unwrap();
        builder.build_return(Some(Value::int(0, 32))).unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn test_render_module() {
        let text = emitter(false).emit_to_string(&version_module()).unwrap();
        let expected = r#"@.str = private unnamed_addr constant [13 x i8] c"Version: %d\0A\00", align 1

@VERSION = global i32 45, align 4

declare i32 @printf(ptr, ...)

define i32 @main() {
entry:
  %0 = load i32, ptr @VERSION, align 4
  %1 = call i32 (ptr, ...) @printf(ptr @.str, i32 %0)
  ret i32 0
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_header() {
        let text = emitter(true).emit_to_string(&version_module()).unwrap();
        assert!(text.starts_with("; ModuleID = 'EvalLLVM'\nsource_filename = \"EvalLLVM\"\n"));
    }

    #[test]
    fn test_bool_and_string_globals() {
        let mut builder = ModuleBuilder::new("EvalLLVM");
        builder
            .define_global("FLAG", Constant::Bool(true), RedefinitionPolicy::Overwrite)
            .unwrap();
        let Value::Constant(text) = builder.string_constant("hi", false) else {
            panic!("expected a constant");
        };
        builder
            .define_global("GREETING", text, RedefinitionPolicy::Overwrite)
            .unwrap();
        let module = builder.finish().unwrap();

        let text = emitter(false).emit_to_string(&module).unwrap();
        assert!(text.contains("@FLAG = global i1 true, align 1\n"));
        assert!(text.contains("@GREETING = global ptr @.str, align 8\n"));
        assert!(text.contains("c\"hi\\00\""));
    }
}
