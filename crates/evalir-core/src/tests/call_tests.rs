use crate::builder::{ModuleBuilder, RedefinitionPolicy};
use crate::function::FunctionSignature;
use crate::instructions::Instruction;
use crate::types::Type;
use crate::values::{Constant, TempId, Value};
use crate::IrError;

fn with_main() -> ModuleBuilder {
    let mut builder = ModuleBuilder::new("Calls");
    builder
        .declare_external_function("printf", vec![Type::Ptr], Type::INTEGER, true)
        .unwrap();
    builder
        .create_function(FunctionSignature::new("main", vec![], Type::INTEGER, false))
        .unwrap();
    builder
}

#[test]
fn test_declare_external_is_idempotent() {
    let mut builder = ModuleBuilder::new("Calls");
    let first = builder
        .declare_external_function("printf", vec![Type::Ptr], Type::INTEGER, true)
        .unwrap();
    let second = builder
        .declare_external_function("printf", vec![Type::Ptr], Type::INTEGER, true)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first, Value::Function("printf".to_string()));
    assert_eq!(builder.module().functions.len(), 1);
    assert!(builder.module().get_function("printf").unwrap().is_external());
}

#[test]
fn test_conflicting_declaration_is_rejected() {
    let mut builder = ModuleBuilder::new("Calls");
    builder
        .declare_external_function("printf", vec![Type::Ptr], Type::INTEGER, true)
        .unwrap();
    let err = builder
        .declare_external_function("printf", vec![Type::Ptr], Type::INTEGER, false)
        .unwrap_err();

    assert!(matches!(err, IrError::DuplicateDefinition(_)));
}

#[test]
fn test_variadic_call_is_appended_in_order() {
    let mut builder = with_main();
    let fmt = builder.string_constant("Value: %d\n", false);
    let result = builder
        .build_call("printf", vec![fmt.clone(), Value::int(42, 32)])
        .unwrap();

    assert_eq!(result, Value::Temp(TempId(0)));
    assert_eq!(builder.value_type(&result).unwrap(), Type::INTEGER);

    let main = builder.current_function().unwrap();
    let entry = main.body.as_ref().unwrap().get_block(main.entry_block().unwrap()).unwrap();
    assert_eq!(
        entry.instructions,
        vec![Instruction::Call {
            result,
            callee: "printf".to_string(),
            args: vec![fmt, Value::int(42, 32)],
            ty: Type::INTEGER,
        }]
    );
}

#[test]
fn test_call_with_wrong_format_type_is_rejected() {
    let mut builder = with_main();
    let err = builder
        .build_call("printf", vec![Value::int(1, 32)])
        .unwrap_err();

    assert!(matches!(err, IrError::TypeMismatch { .. }));
    let main = builder.current_function().unwrap();
    assert_eq!(main.instruction_count(), 0);
}

#[test]
fn test_call_to_unknown_function() {
    let mut builder = with_main();
    let err = builder.build_call("puts", vec![]).unwrap_err();
    assert!(matches!(err, IrError::FunctionNotFound(name) if name == "puts"));
}

#[test]
fn test_load_is_typed_to_initializer() {
    let mut builder = ModuleBuilder::new("Loads");
    let flag = builder
        .define_global("FLAG", Constant::Bool(true), RedefinitionPolicy::Overwrite)
        .unwrap();
    builder
        .create_function(FunctionSignature::new("main", vec![], Type::INTEGER, false))
        .unwrap();

    let loaded = builder.build_load(flag).unwrap();
    assert_eq!(builder.value_type(&loaded).unwrap(), Type::Bool);
}
