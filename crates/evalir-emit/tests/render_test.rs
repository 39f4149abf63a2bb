use evalir_core::{Constant, FunctionSignature, ModuleBuilder, RedefinitionPolicy, Type, Value};
use evalir_emit::{render, Emitter, EmitterConfig, IndentStyle, TextEmitter};
use pretty_assertions::assert_eq;

fn hello() -> evalir_core::Module {
    let mut builder = ModuleBuilder::new("EvalLLVM");
    builder
        .declare_external_function("printf", vec![Type::Ptr], Type::INTEGER, true)
        .unwrap();
    builder
        .create_function(FunctionSignature::new("main", vec![], Type::INTEGER, false))
        .unwrap();
    let fmt = builder.string_constant("Hello, world!\n", false);
    builder.build_call("printf", vec![fmt]).unwrap();
    builder.build_return(Some(Value::int(0, 32))).unwrap();
    builder.finish().unwrap()
}

#[test]
fn test_render_hello_world() {
    let text = render(&hello()).unwrap();
    let expected = r#"; ModuleID = 'EvalLLVM'
source_filename = "EvalLLVM"

@.str = private unnamed_addr constant [15 x i8] c"Hello, world!\0A\00", align 1

declare i32 @printf(ptr, ...)

define i32 @main() {
entry:
  %0 = call i32 (ptr, ...) @printf(ptr @.str)
  ret i32 0
}
"#;
    assert_eq!(text, expected);
}

#[test]
fn test_render_with_tabs() {
    let emitter = TextEmitter::new(EmitterConfig {
        include_header: false,
        indent_style: IndentStyle::Tabs,
        ..EmitterConfig::default()
    });
    let text = emitter.emit_to_string(&hello()).unwrap();
    assert!(text.contains("\n\tret i32 0\n"));
    assert!(!text.contains("ModuleID"));
}

#[test]
fn test_source_hash_in_header() {
    let mut module = hello();
    module.record_source(Some("hello.eva"), "(printf \"Hello, world!\\n\")");

    let text = render(&module).unwrap();
    assert!(text.contains("source_filename = \"hello.eva\""));
    assert!(text.contains("; source sha256 = "));
}

#[test]
fn test_render_quotes_symbolic_global_names() {
    let mut builder = ModuleBuilder::new("EvalLLVM");
    builder
        .declare_external_function("printf", vec![Type::Ptr], Type::INTEGER, true)
        .unwrap();
    let sum = builder
        .define_global(
            "a+b",
            Constant::Int { value: 1, bits: 32 },
            RedefinitionPolicy::Overwrite,
        )
        .unwrap();
    builder
        .create_function(FunctionSignature::new("main", vec![], Type::INTEGER, false))
        .unwrap();
    let fmt = builder.string_constant("%d", false);
    let loaded = builder.build_load(sum).unwrap();
    builder.build_call("printf", vec![fmt, loaded]).unwrap();
    builder.build_return(Some(Value::int(0, 32))).unwrap();

    let text = render(&builder.finish().unwrap()).unwrap();
    assert!(text.contains("@\"a+b\" = global i32 1, align 4\n"));
    assert!(text.contains("%0 = load i32, ptr @\"a+b\", align 4\n"));
    assert!(!text.contains("@a+b"));
}
