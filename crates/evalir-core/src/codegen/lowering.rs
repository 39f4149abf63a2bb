use cranelift::codegen::ir::{self as clif_ir, types, AbiParam, InstBuilder, MemFlags};
use cranelift_frontend::FunctionBuilder;
use cranelift_module::Module as ClifModule;
use std::collections::HashMap;

use crate::{
    block::Terminator,
    codegen::context::CodegenContext,
    function::Function,
    instructions::Instruction,
    module::Module,
    types::Type,
    values::{Constant, TempId, Value},
    IrError, Result,
};

pub type SsaValues = HashMap<TempId, clif_ir::Value>;

pub fn lower_value<M: ClifModule>(
    value: &Value,
    ctx: &CodegenContext,
    module: &mut M,
    builder: &mut FunctionBuilder,
    ssa_values: &SsaValues,
) -> Result<clif_ir::Value> {
    match value {
        Value::Constant(Constant::Int { value, bits }) => {
            let ty = ctx.get_clif_type(&Type::Int(*bits))?;
            Ok(builder.ins().iconst(ty, *value))
        }
        Value::Constant(Constant::Bool(b)) => Ok(builder.ins().iconst(types::I8, *b as i64)),
        Value::Constant(Constant::Null) => Ok(builder.ins().iconst(ctx.pointer, 0)),
        Value::Constant(Constant::Str(id)) => {
            let data = ctx.string_data(*id)?;
            let gv = module.declare_data_in_func(data, builder.func);
            Ok(builder.ins().global_value(ctx.pointer, gv))
        }
        Value::Global(id) => {
            let data = ctx.global_data(*id)?;
            let gv = module.declare_data_in_func(data, builder.func);
            Ok(builder.ins().global_value(ctx.pointer, gv))
        }
        Value::Function(name) => {
            let func_id = ctx.function(name)?;
            let fref = module.declare_func_in_func(func_id, builder.func);
            Ok(builder.ins().func_addr(ctx.pointer, fref))
        }
        Value::Temp(id) => ssa_values
            .get(id)
            .copied()
            .ok_or_else(|| IrError::CraneliftError(format!("Temp {} used before definition", id))),
    }
}

fn bind(result: &Value, value: clif_ir::Value, ssa_values: &mut SsaValues) -> Result<()> {
    match result {
        Value::Temp(id) => {
            ssa_values.insert(*id, value);
            Ok(())
        }
        other => Err(IrError::CraneliftError(format!(
            "Instruction result must be a temp, found {:?}",
            other
        ))),
    }
}

pub fn lower_instruction<M: ClifModule>(
    inst: &Instruction,
    ir: &Module,
    function: &Function,
    ctx: &CodegenContext,
    module: &mut M,
    builder: &mut FunctionBuilder,
    ssa_values: &mut SsaValues,
) -> Result<()> {
    match inst {
        Instruction::Load { result, ty, global } => {
            let data = ctx.global_data(*global)?;
            let gv = module.declare_data_in_func(data, builder.func);
            let addr = builder.ins().global_value(ctx.pointer, gv);
            let loaded = builder
                .ins()
                .load(ctx.get_clif_type(ty)?, MemFlags::trusted(), addr, 0);
            bind(result, loaded, ssa_values)
        }
        Instruction::Call {
            result,
            callee,
            args,
            ty,
        } => {
            let target = ir
                .get_function(callee)
                .ok_or_else(|| IrError::FunctionNotFound(callee.clone()))?;
            let fixed = target.signature.params.len();

            let mut sig = module.make_signature();
            let mut values = Vec::with_capacity(args.len());
            for (index, arg) in args.iter().enumerate() {
                let arg_ty = ir.value_type(function, arg)?;
                let mut clif_ty = ctx.get_clif_type(&arg_ty)?;
                let mut value = lower_value(arg, ctx, module, builder, ssa_values)?;

                // C default argument promotion for the variadic tail.
                if index >= fixed && clif_ty.bits() < 32 {
                    value = if arg_ty == Type::Bool {
                        builder.ins().uextend(types::I32, value)
                    } else {
                        builder.ins().sextend(types::I32, value)
                    };
                    clif_ty = types::I32;
                }

                sig.params.push(AbiParam::new(clif_ty));
                values.push(value);
            }
            if *ty != Type::Void {
                sig.returns.push(AbiParam::new(ctx.get_clif_type(ty)?));
            }

            let func_id = ctx.function(callee)?;
            let fref = module.declare_func_in_func(func_id, builder.func);
            let call = if target.signature.is_variadic {
                let addr = builder.ins().func_addr(ctx.pointer, fref);
                let sig_ref = builder.import_signature(sig);
                builder.ins().call_indirect(sig_ref, addr, &values)
            } else {
                builder.ins().call(fref, &values)
            };

            match builder.inst_results(call).first() {
                Some(&ret) => bind(result, ret, ssa_values),
                None => Ok(()),
            }
        }
    }
}

pub fn lower_terminator<M: ClifModule>(
    term: &Terminator,
    ctx: &CodegenContext,
    module: &mut M,
    builder: &mut FunctionBuilder,
    ssa_values: &SsaValues,
) -> Result<()> {
    match term {
        Terminator::Return(Some(value)) => {
            let value = lower_value(value, ctx, module, builder, ssa_values)?;
            builder.ins().return_(&[value]);
            Ok(())
        }
        Terminator::Return(None) => {
            builder.ins().return_(&[]);
            Ok(())
        }
        Terminator::Invalid => Err(IrError::CraneliftError(
            "Cannot lower a block without a terminator".to_string(),
        )),
    }
}
