use evalir_core::{
    codegen::ObjectEmitter, Constant, FunctionSignature, Module, ModuleBuilder, RedefinitionPolicy,
    Type, Value,
};

const TRIPLE: &str = "x86_64-unknown-linux-gnu";

fn build(globals: &[(&str, Constant)], calls: &[(&str, Option<&str>)]) -> Module {
    let mut builder = ModuleBuilder::new("EvalLLVM");
    builder
        .declare_external_function("printf", vec![Type::Ptr], Type::INTEGER, true)
        .unwrap();
    for (name, init) in globals {
        builder
            .define_global(name, init.clone(), RedefinitionPolicy::Overwrite)
            .unwrap();
    }
    builder
        .create_function(FunctionSignature::new("main", vec![], Type::INTEGER, false))
        .unwrap();

    for (fmt, global) in calls {
        let fmt = builder.string_constant(fmt, false);
        let mut args = vec![fmt];
        if let Some(name) = global {
            let id = builder.module().get_global(name).unwrap().id;
            args.push(builder.build_load(id).unwrap());
        }
        builder.build_call("printf", args).unwrap();
    }
    builder.build_return(Some(Value::int(0, 32))).unwrap();
    builder.finish().unwrap()
}

#[test]
fn test_empty_main_compiles() {
    let module = build(&[], &[]);
    let bytes = ObjectEmitter::for_target(TRIPLE, "EvalLLVM")
        .unwrap()
        .emit(&module)
        .unwrap();
    assert_eq!(&bytes[..4], b"\x7fELF");
}

#[test]
fn test_variadic_printf_with_int_compiles() {
    let module = build(
        &[("VERSION", Constant::Int { value: 45, bits: 32 })],
        &[("Version: %d\n", Some("VERSION"))],
    );
    let emitter = ObjectEmitter::for_target(TRIPLE, "EvalLLVM").unwrap();
    assert!(emitter.emit(&module).is_ok());
}

#[test]
fn test_bool_argument_is_promoted() {
    let module = build(
        &[("FLAG", Constant::Bool(true))],
        &[("%d\n", Some("FLAG"))],
    );
    let emitter = ObjectEmitter::for_target(TRIPLE, "EvalLLVM").unwrap();
    assert!(emitter.emit(&module).is_ok());
}

#[test]
fn test_arm64_target() {
    let module = build(&[], &[("hi\n", None)]);
    let emitter = ObjectEmitter::for_target("aarch64-unknown-linux-gnu", "EvalLLVM").unwrap();
    let bytes = emitter.emit(&module).unwrap();
    assert_eq!(&bytes[..4], b"\x7fELF");
}

#[test]
fn test_unknown_target_is_rejected() {
    assert!(ObjectEmitter::for_target("not-a-triple", "EvalLLVM").is_err());
}
