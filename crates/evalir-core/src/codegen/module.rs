use cranelift::codegen::ir::{AbiParam, Signature};
use cranelift::codegen::isa::{self, OwnedTargetIsa};
use cranelift::codegen::settings::{self, Configurable};
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_module::{DataDescription, Linkage as ClifLinkage, Module as ClifModule};
use cranelift_object::{ObjectBuilder, ObjectModule};
use std::collections::HashMap;
use tracing::debug;

use crate::{
    codegen::context::CodegenContext,
    codegen::lowering::{lower_instruction, lower_terminator, SsaValues},
    function::{Function, Linkage},
    module::{GlobalVariable, Module},
    types::Type,
    values::Constant,
    IrError, Result,
};

/// Lowers a finished IR module to a relocatable native object file.
pub struct ObjectEmitter {
    module: ObjectModule,
}

impl ObjectEmitter {
    /// Target the host machine.
    pub fn new(name: &str) -> Result<Self> {
        let isa_builder = cranelift_native::builder()
            .map_err(|e| IrError::CraneliftError(format!("Failed to detect host ISA: {}", e)))?;
        Self::with_isa_builder(isa_builder, name)
    }

    pub fn for_target(triple: &str, name: &str) -> Result<Self> {
        let isa_builder = isa::lookup_by_name(triple)
            .map_err(|e| IrError::CraneliftError(format!("Failed to lookup ISA: {}", e)))?;
        Self::with_isa_builder(isa_builder, name)
    }

    fn with_isa_builder(isa_builder: isa::Builder, name: &str) -> Result<Self> {
        let mut flags_builder = settings::builder();
        flags_builder
            .set("is_pic", "true")
            .map_err(|e| IrError::CraneliftError(format!("Failed to set flags: {}", e)))?;

        let isa: OwnedTargetIsa = isa_builder
            .finish(settings::Flags::new(flags_builder))
            .map_err(|e| IrError::CraneliftError(format!("Failed to create ISA: {}", e)))?;

        let object_builder =
            ObjectBuilder::new(isa, name, cranelift_module::default_libcall_names()).map_err(
                |e| IrError::CraneliftError(format!("Failed to create object builder: {}", e)),
            )?;

        Ok(Self {
            module: ObjectModule::new(object_builder),
        })
    }

    pub fn emit(mut self, ir: &Module) -> Result<Vec<u8>> {
        let pointer = self.module.target_config().pointer_type();
        let mut ctx = CodegenContext::new(pointer);

        self.declare_strings(ir, &mut ctx)?;
        self.declare_globals(ir, &mut ctx)?;
        self.declare_functions(ir, &mut ctx)?;

        for function in ir.defined_functions() {
            self.define_function(ir, function, &ctx)?;
        }

        let product = self.module.finish();
        product
            .emit()
            .map_err(|e| IrError::CraneliftError(format!("Failed to emit object: {}", e)))
    }

    fn declare_strings(&mut self, ir: &Module, ctx: &mut CodegenContext) -> Result<()> {
        for string in &ir.strings {
            let data_id = self
                .module
                .declare_data(&string.name, ClifLinkage::Local, false, false)
                .map_err(|e| IrError::CraneliftError(format!("Failed to declare data: {}", e)))?;

            let mut desc = DataDescription::new();
            desc.define(string.bytes_with_nul().into_boxed_slice());
            self.module
                .define_data(data_id, &desc)
                .map_err(|e| IrError::CraneliftError(format!("Failed to define data: {}", e)))?;

            ctx.strings.insert(string.id, data_id);
        }
        Ok(())
    }

    fn declare_globals(&mut self, ir: &Module, ctx: &mut CodegenContext) -> Result<()> {
        for global in ir.globals.values() {
            let data_id = self
                .module
                .declare_data(&global.name, ClifLinkage::Export, global.mutable, false)
                .map_err(|e| IrError::CraneliftError(format!("Failed to declare data: {}", e)))?;
            ctx.globals.insert(global.id, data_id);
        }

        for global in ir.globals.values() {
            let desc = self.describe_global(global, ctx)?;
            self.module
                .define_data(ctx.global_data(global.id)?, &desc)
                .map_err(|e| IrError::CraneliftError(format!("Failed to define data: {}", e)))?;
        }
        Ok(())
    }

    fn describe_global(
        &mut self,
        global: &GlobalVariable,
        ctx: &CodegenContext,
    ) -> Result<DataDescription> {
        let pointer_bytes = ctx.pointer.bytes() as usize;
        let mut desc = DataDescription::new();
        desc.set_align(global.alignment as u64);

        let bytes = match &global.initializer {
            Constant::Int { value, .. } => {
                let size = global.ty.size_bytes().min(8);
                value.to_le_bytes()[..size].to_vec()
            }
            Constant::Bool(b) => vec![*b as u8],
            Constant::Null => vec![0; pointer_bytes],
            Constant::Str(id) => {
                let gv = self
                    .module
                    .declare_data_in_data(ctx.string_data(*id)?, &mut desc);
                desc.write_data_addr(0, gv, 0);
                vec![0; pointer_bytes]
            }
        };
        desc.define(bytes.into_boxed_slice());
        Ok(desc)
    }

    fn signature_for(&self, function: &Function, ctx: &CodegenContext) -> Result<Signature> {
        let mut sig = self.module.make_signature();
        for param in &function.signature.params {
            sig.params.push(AbiParam::new(ctx.get_clif_type(param)?));
        }
        if function.signature.returns != Type::Void {
            sig.returns
                .push(AbiParam::new(ctx.get_clif_type(&function.signature.returns)?));
        }
        Ok(sig)
    }

    fn declare_functions(&mut self, ir: &Module, ctx: &mut CodegenContext) -> Result<()> {
        for function in ir.functions.values() {
            let sig = self.signature_for(function, ctx)?;
            let linkage = match function.linkage {
                Linkage::Export => ClifLinkage::Export,
                Linkage::Import => ClifLinkage::Import,
                Linkage::Local => ClifLinkage::Local,
            };

            let func_id = self
                .module
                .declare_function(function.name(), linkage, &sig)
                .map_err(|e| {
                    IrError::CraneliftError(format!("Failed to declare function: {}", e))
                })?;
            ctx.functions.insert(function.name().to_string(), func_id);
        }
        Ok(())
    }

    fn define_function(&mut self, ir: &Module, function: &Function, ctx: &CodegenContext) -> Result<()> {
        let body = function.body.as_ref().ok_or_else(|| {
            IrError::CraneliftError(format!("@{} has no body to compile", function.name()))
        })?;
        let func_id = ctx.function(function.name())?;

        let mut context = self.module.make_context();
        context.func.signature = self.signature_for(function, ctx)?;
        let mut builder_context = FunctionBuilderContext::new();

        {
            let mut builder = FunctionBuilder::new(&mut context.func, &mut builder_context);
            let mut block_map = HashMap::new();
            let mut ssa_values = SsaValues::new();

            for block_id in body.blocks.keys() {
                block_map.insert(*block_id, builder.create_block());
            }

            let entry = block_map
                .get(&body.entry_block)
                .copied()
                .ok_or_else(|| IrError::CraneliftError("Missing entry block".to_string()))?;
            builder.append_block_params_for_function_params(entry);

            for (block_id, block) in &body.blocks {
                let clif_block = block_map[block_id];
                builder.switch_to_block(clif_block);

                for inst in &block.instructions {
                    lower_instruction(
                        inst,
                        ir,
                        function,
                        ctx,
                        &mut self.module,
                        &mut builder,
                        &mut ssa_values,
                    )?;
                }

                lower_terminator(
                    &block.terminator,
                    ctx,
                    &mut self.module,
                    &mut builder,
                    &ssa_values,
                )?;
            }

            builder.seal_all_blocks();
            builder.finalize();
        }

        debug!(name = function.name(), "define function");
        self.module
            .define_function(func_id, &mut context)
            .map_err(|e| IrError::CraneliftError(format!("Failed to define function: {}", e)))?;
        self.module.clear_context(&mut context);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ModuleBuilder, RedefinitionPolicy};
    use crate::function::FunctionSignature;
    use crate::values::Value;

    fn hello_module() -> Module {
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
    fn test_emit_elf_object() {
        let emitter = ObjectEmitter::for_target("x86_64-unknown-linux-gnu", "EvalLLVM").unwrap();
        let bytes = emitter.emit(&hello_module()).unwrap();
        assert_eq!(&bytes[..4], b"\x7fELF");
    }

    #[test]
    fn test_emit_string_initialized_global() {
        let mut builder = ModuleBuilder::new("EvalLLVM");
        let greeting = builder.string_constant("hi", false);
        let Value::Constant(init) = greeting else {
            panic!("string constants lower to constants");
        };
        builder
            .define_global("GREETING", init, RedefinitionPolicy::Overwrite)
            .unwrap();
        builder
            .create_function(FunctionSignature::new("main", vec![], Type::INTEGER, false))
            .unwrap();
        builder.build_return(Some(Value::int(0, 32))).unwrap();
        let module = builder.finish().unwrap();

        let emitter = ObjectEmitter::for_target("x86_64-unknown-linux-gnu", "EvalLLVM").unwrap();
        assert!(emitter.emit(&module).is_ok());
    }
}
