use super::*;
use crate::parser::{strip_comments, LineIndex};

fn parse_text(src: &str) -> Vec<FunctionInfo> {
    let stripped = strip_comments(src);
    let idx = LineIndex::new(&stripped);
    parse(&stripped, "demo.c", &idx)
}

#[test]
fn recognizes_plain_func_macro() {
    let src = "FUNC(void, RTE_CODE) Demo_Init(void) {\n    Setup();\n}\n";
    let defs = parse_text(src);
    assert_eq!(defs.len(), 1);
    let f = &defs[0];
    assert_eq!(f.name, "Demo_Init");
    assert_eq!(f.return_type, "void");
    assert_eq!(f.kind, FunctionKind::AutosarFunc);
    assert_eq!(f.memory_class.as_deref(), Some("RTE_CODE"));
    assert!(f.parameters.is_empty());
    assert_eq!(f.calls.len(), 1);
}

#[test]
fn static_prefix_is_recorded() {
    let src = "static FUNC(uint8, AUTOMATIC) Helper(void) { return 0; }\n";
    let defs = parse_text(src);
    assert!(defs[0].is_static);
}

#[test]
fn func_p2var_renders_pointer_return_type() {
    let src = "FUNC_P2VAR(uint8, AUTOMATIC, RTE_POINTER) GetBuffer(void) {\n    return 0;\n}\n";
    let defs = parse_text(src);
    assert_eq!(defs[0].return_type, "uint8*");
    assert_eq!(defs[0].kind, FunctionKind::AutosarFuncP2Var);
}

#[test]
fn func_p2const_renders_const_pointer_return_type() {
    let src = "FUNC_P2CONST(uint8, AUTOMATIC, RTE_CONST_POINTER) GetConstBuffer(void) {\n    return 0;\n}\n";
    let defs = parse_text(src);
    assert_eq!(defs[0].return_type, "const uint8*");
    assert_eq!(defs[0].kind, FunctionKind::AutosarFuncP2Const);
}

#[test]
fn parameter_macros_are_decoded() {
    let src = "FUNC(void, RTE_CODE) Process(\n    VAR(uint8, AUTOMATIC) count,\n    P2VAR(uint8, AUTOMATIC, RTE_POINTER) out,\n    P2CONST(uint8, AUTOMATIC, RTE_CONST) in,\n    CONST(uint8, AUTOMATIC) limit\n) {\n    Inner();\n}\n";
    let defs = parse_text(src);
    let params = &defs[0].parameters;
    assert_eq!(params.len(), 4);
    assert_eq!(params[0].name, "count");
    assert!(!params[0].is_pointer && !params[0].is_const);
    assert_eq!(params[1].name, "out");
    assert!(params[1].is_pointer && !params[1].is_const);
    assert_eq!(params[2].name, "in");
    assert!(params[2].is_pointer && params[2].is_const);
    assert_eq!(params[3].name, "limit");
    assert!(!params[3].is_pointer && params[3].is_const);
}

#[test]
fn void_only_parameter_list_is_empty() {
    let src = "FUNC(void, RTE_CODE) NoArgs( void ) {\n    Foo();\n}\n";
    let defs = parse_text(src);
    assert!(defs[0].parameters.is_empty());
}

#[test]
fn forward_declaration_without_body_is_not_indexed() {
    let src = "FUNC(void, RTE_CODE) Forward(void);\n";
    let defs = parse_text(src);
    assert!(defs.is_empty());
}

#[test]
fn macro_token_only_recognized_at_line_start() {
    // appears mid-line, inside a string literal; must not be mistaken for a header
    let src = "char *s = \"FUNC(void, RTE_CODE) NotReal(void) {}\";\n";
    let defs = parse_text(src);
    assert!(defs.is_empty());
}

#[test]
fn qualified_name_uses_file_stem_and_name() {
    let src = "FUNC(void, RTE_CODE) Demo_Init(void) {\n    Setup();\n}\n";
    let defs = parse_text(src);
    assert_eq!(defs[0].qualified_name.as_deref(), Some("demo::Demo_Init"));
}
