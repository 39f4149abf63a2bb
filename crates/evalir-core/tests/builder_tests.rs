use evalir_core::{
    BlockId, Constant, FunctionSignature, Instruction, IrError, ModuleBuilder, RedefinitionPolicy,
    TempId, Terminator, Type, Value,
};
use pretty_assertions::assert_eq;

fn printf(builder: &mut ModuleBuilder) -> Value {
    builder
        .declare_external_function("printf", vec![Type::Ptr], Type::INTEGER, true)
        .unwrap()
}

#[test]
fn test_hello_module() {
    let mut builder = ModuleBuilder::new("EvalLLVM");
    printf(&mut builder);
    builder
        .create_function(FunctionSignature::new("main", vec![], Type::INTEGER, false))
        .unwrap();

    let fmt = builder.string_constant("Hello, world!\n", false);
    builder.build_call("printf", vec![fmt]).unwrap();
    builder.build_return(Some(Value::int(0, 32))).unwrap();

    let module = builder.finish().unwrap();
    assert_eq!(module.name, "EvalLLVM");
    assert_eq!(module.strings.len(), 1);
    assert_eq!(module.strings[0].value, "Hello, world!\n");
    assert_eq!(module.external_functions().count(), 1);
    assert_eq!(module.defined_functions().count(), 1);

    let main = module.get_function("main").unwrap();
    assert_eq!(main.instruction_count(), 1);
    let entry = main.body.as_ref().unwrap().get_block(BlockId(0)).unwrap();
    assert_eq!(entry.name, "entry");
    assert!(entry.terminator.is_return());
}

#[test]
fn test_storage_read_after_overwrite() {
    let mut builder = ModuleBuilder::new("EvalLLVM");
    printf(&mut builder);
    let x = builder
        .define_global("X", Constant::Int { value: 1, bits: 32 }, RedefinitionPolicy::Overwrite)
        .unwrap();
    builder
        .define_global("X", Constant::Int { value: 2, bits: 32 }, RedefinitionPolicy::Overwrite)
        .unwrap();
    builder
        .create_function(FunctionSignature::new("main", vec![], Type::INTEGER, false))
        .unwrap();

    let fmt = builder.string_constant("%d", false);
    let loaded = builder.build_load(x).unwrap();
    builder.build_call("printf", vec![fmt, loaded]).unwrap();
    builder.build_return(Some(Value::int(0, 32))).unwrap();
    let module = builder.finish().unwrap();

    assert_eq!(module.globals.len(), 1);
    assert_eq!(
        module.globals["X"].initializer,
        Constant::Int { value: 2, bits: 32 }
    );

    let main = module.get_function("main").unwrap();
    let entry = main.body.as_ref().unwrap().get_block(BlockId(0)).unwrap();
    assert_eq!(
        entry.instructions[0],
        Instruction::Load {
            result: Value::Temp(TempId(0)),
            ty: Type::INTEGER,
            global: x,
        }
    );
    assert!(entry.instructions[1].is_call());
    assert_eq!(entry.instructions[1].operands()[1], &Value::Temp(TempId(0)));
}

#[test]
fn test_finish_rejects_open_block() {
    let mut builder = ModuleBuilder::new("EvalLLVM");
    builder
        .create_function(FunctionSignature::new("main", vec![], Type::INTEGER, false))
        .unwrap();

    let err = builder.finish().unwrap_err();
    assert!(matches!(err, IrError::BuilderError(_)));
}

#[test]
fn test_declaration_only_module() {
    let mut builder = ModuleBuilder::new("Decls");
    printf(&mut builder);
    let module = builder.finish().unwrap();

    let printf = module.get_function("printf").unwrap();
    assert!(printf.is_external());
    assert_eq!(printf.signature.function_type().to_string(), "i32 (ptr, ...)");
    assert_eq!(printf.entry_block(), None);
}

#[test]
fn test_void_return() {
    let mut builder = ModuleBuilder::new("Void");
    builder
        .create_function(FunctionSignature::new("init", vec![], Type::Void, false))
        .unwrap();
    builder.build_return(None).unwrap();
    let module = builder.finish().unwrap();

    let init = module.get_function("init").unwrap();
    let entry = init.body.as_ref().unwrap().get_block(BlockId(0)).unwrap();
    assert_eq!(entry.terminator, Terminator::Return(None));
}
