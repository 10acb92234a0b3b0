use super::*;
use crate::frontend::Parser;

fn analyze(source: &str) -> (Analyzer, Program, Interner) {
    let mut parser = Parser::new(source);
    let program = parser.parse_program().unwrap();
    let interner = parser.into_interner();
    let mut analyzer = Analyzer::new();
    let _ = analyzer.analyze(&program, &interner);
    (analyzer, program, interner)
}

fn check(source: &str) -> Result<(), Vec<TypeError>> {
    let (analyzer, _, _) = analyze(source);
    if analyzer.errors().is_empty() {
        Ok(())
    } else {
        Err(analyzer.errors().to_vec())
    }
}

fn errors(source: &str) -> Vec<SemanticError> {
    check(source)
        .err()
        .unwrap_or_default()
        .into_iter()
        .map(|e| e.error)
        .collect()
}

fn method<'a>(program: &'a Program, interner: &Interner, name: &str) -> &'a MethodDecl {
    program
        .declarations
        .iter()
        .find_map(|d| match d {
            Decl::Method(m) if interner.resolve(m.name) == name => Some(m),
            _ => None,
        })
        .unwrap()
}

fn wrap(members: &str) -> String {
    format!("using CbRuntime;\nclass Test {{\n{}\nstatic void Main() {{}}\n}}", members)
}

#[test]
fn well_typed_program_has_no_errors() {
    let source = wrap(
        r#"
        const int limit = 10;
        const string greeting = "hi";
        struct Point { int x, y; }
        static int twice(int n) { return n * 2; }
        static void run() {
            int i;
            int[] values;
            Point p;
            bool done;
            values = new int[limit];
            i = 0;
            while (i < values.Length) {
                values[i] = twice(i) % 3;
                i++;
            }
            p.x = values[0];
            done = p.x >= 0 && greeting.Length != 0 || false;
            if (done) { cbio.write(greeting); } else { cbio.write(p.x); }
            cbio.read(out p.y);
        }
        "#,
    );
    assert_eq!(check(&source), Ok(()));
}

#[test]
fn every_expression_gets_a_non_error_type() {
    let source = wrap("static int f(int a) { int b; b = -a + 4; return b / 2; }");
    let (analyzer, _, _) = analyze(&source);
    assert_eq!(analyzer.error_count(), 0);
    let types = analyzer.expression_data().types();
    assert!(!types.is_empty());
    assert!(types.values().all(|ty| !ty.is_error()));
}

#[test]
fn undeclared_identifier_reported_once_per_scope() {
    let source = wrap("static void f() { int a; a = x; a = x + 1; x = 2; }");
    let errs = errors(&source);
    assert_eq!(errs.len(), 1, "{:?}", errs);
    assert!(matches!(
        &errs[0],
        SemanticError::UndeclaredIdentifier { name, .. } if name == "x"
    ));
}

#[test]
fn duplicate_field_keeps_first() {
    let source = wrap(
        "struct S { int a; string a; }
         static void f() { S s; s.a = 1; }",
    );
    let errs = errors(&source);
    assert_eq!(errs.len(), 1, "{:?}", errs);
    assert!(matches!(
        &errs[0],
        SemanticError::DuplicateField { struct_name, field, .. }
            if struct_name == "S" && field == "a"
    ));
}

#[test]
fn block_locals_disappear_at_block_end() {
    let source = wrap(
        "static void f(bool c) {
            if (c) { int y; y = 1; } else { string y; y = \"s\"; }
            y = 2;
        }",
    );
    let errs = errors(&source);
    assert_eq!(errs.len(), 1, "{:?}", errs);
    assert!(matches!(&errs[0], SemanticError::UndeclaredIdentifier { .. }));
}

#[test]
fn body_may_shadow_a_formal() {
    let source = wrap("static void f(int a) { string a; a = \"s\"; }");
    assert_eq!(check(&source), Ok(()));
}

#[test]
fn duplicate_local_in_same_block() {
    let source = wrap("static void f() { int a; bool a; }");
    let errs = errors(&source);
    assert!(matches!(&errs[..], [SemanticError::DuplicateLocal { name, .. }] if name == "a"));
}

#[test]
fn overloads_resolve_by_argument_types() {
    let source = wrap(
        "static void f(int a) {}
         static void f(string s) {}
         static void g() { f(5); f(\"x\"); }",
    );
    let (analyzer, program, interner) = analyze(&source);
    assert_eq!(analyzer.error_count(), 0);

    let g = method(&program, &interner, "g");
    let labels: Vec<String> = g
        .body
        .stmts
        .iter()
        .map(|stmt| match stmt {
            Stmt::Call(call) => {
                let id = analyzer.expression_data().get_call(call.call.id).unwrap();
                analyzer.methods.label(id)
            }
            _ => panic!("expected call statement"),
        })
        .collect();
    assert_eq!(labels, ["f.1", "f.2"]);
}

#[test]
fn unmatched_overload_reported_once() {
    let source = wrap(
        "static void f(int a) {}
         static void f(string s) {}
         static void g() { f(true); }",
    );
    let errs = errors(&source);
    assert_eq!(errs.len(), 1, "{:?}", errs);
    assert!(matches!(&errs[0], SemanticError::NoMatchingOverload { name, .. } if name == "f"));
}

#[test]
fn identical_overload_is_a_duplicate() {
    let source = wrap("static void f(int a) {} static int f(int b) { return b; }");
    let errs = errors(&source);
    assert!(matches!(
        &errs[..],
        [SemanticError::DuplicateDeclaration { kind: "method", .. }]
    ));
}

#[test]
fn sum_of_pair_annotates_return_as_int() {
    let source = wrap(
        "const int N = 10;
         struct Pair { int a; int b; }
         static int sum(Pair p) { return p.a + p.b; }",
    );
    let (analyzer, program, interner) = analyze(&source);
    assert_eq!(analyzer.error_count(), 0);

    let sum = method(&program, &interner, "sum");
    let Stmt::Return(ret) = &sum.body.stmts[0] else {
        panic!("expected return");
    };
    let value = ret.value.as_ref().unwrap();
    assert_eq!(analyzer.expression_data().get_type(value.id), Some(TypeId::INT));
    assert_eq!(analyzer.expression_data().frame_slots(sum.id), Some(0));
}

#[test]
fn frame_slots_count_words() {
    let source = wrap(
        "struct Pair { int a; int b; }
         static void f() { int x; Pair p; if (true) { int y; } }",
    );
    let (analyzer, program, interner) = analyze(&source);
    let f = method(&program, &interner, "f");
    assert_eq!(analyzer.expression_data().frame_slots(f.id), Some(4));
}

#[test]
fn analysis_is_repeatable() {
    let source = wrap("static int f(int a) { bool b; b = a; return b + 1; }");
    let mut parser = Parser::new(&source);
    let program = parser.parse_program().unwrap();
    let interner = parser.into_interner();

    let mut first = Analyzer::new();
    let first_result = first.analyze(&program, &interner);
    let mut second = Analyzer::new();
    let second_result = second.analyze(&program, &interner);

    assert_eq!(first_result, second_result);
    assert_eq!(first.error_count(), 2);
    assert_eq!(first.expression_data(), second.expression_data());
}

#[test]
fn error_operands_do_not_cascade() {
    let source = wrap("static void f() { int a; a = (missing + 1) * 2; }");
    let errs = errors(&source);
    assert_eq!(errs.len(), 1, "{:?}", errs);
}

#[test]
fn mismatched_operands_name_the_operator() {
    let source = wrap("static void f() { int a; a = 1 + true; }");
    let errs = errors(&source);
    assert!(matches!(
        &errs[..],
        [SemanticError::InvalidOperands { op: "+", types, .. }] if types == "int and bool"
    ));
}

#[test]
fn member_access_rules() {
    let source = wrap(
        "struct S { int a; }
         static void f() { int n; S s; n = s.b; n = n.Length; }",
    );
    let errs = errors(&source);
    assert!(matches!(errs[0], SemanticError::UnknownField { .. }));
    assert!(matches!(errs[1], SemanticError::InvalidMemberAccess { .. }));
    assert_eq!(errs.len(), 2);
}

#[test]
fn indexing_rules() {
    let source = wrap("static void f() { int n; int[] a; n = n[0]; n = a[true]; }");
    let errs = errors(&source);
    assert!(matches!(errs[0], SemanticError::InvalidIndexTarget { .. }));
    assert!(matches!(errs[1], SemanticError::InvalidIndexType { .. }));
}

#[test]
fn conditions_must_be_bool() {
    let source = wrap("static void f() { if (1) { } while (\"s\") { } }");
    let errs = errors(&source);
    assert_eq!(errs.len(), 2);
    assert!(errs.iter().all(|e| matches!(e, SemanticError::InvalidCondition { .. })));
}

#[test]
fn every_return_is_checked() {
    let source = wrap(
        "static int f(bool c) {
            if (c) { return true; }
            while (c) { return; }
            return 1;
        }",
    );
    let errs = errors(&source);
    assert_eq!(errs.len(), 2, "{:?}", errs);
    assert!(errs.iter().all(|e| matches!(e, SemanticError::ReturnTypeMismatch { .. })));
}

#[test]
fn constants_and_length_are_read_only() {
    let source = wrap(
        "const int k = 1;
         static void f() { int[] a; k = 2; a.Length = 3; k++; }",
    );
    let errs = errors(&source);
    assert_eq!(errs.len(), 3, "{:?}", errs);
    assert!(errs.iter().all(|e| matches!(e, SemanticError::NotAssignable { .. })));
}

#[test]
fn increment_requires_int() {
    let source = wrap("static void f() { bool b; b++; }");
    let errs = errors(&source);
    assert!(matches!(&errs[..], [SemanticError::InvalidOperands { op: "++", .. }]));
}

#[test]
fn break_outside_loop() {
    let source = wrap("static void f() { while (true) { break; } break; }");
    let errs = errors(&source);
    assert!(matches!(&errs[..], [SemanticError::BreakOutsideLoop { .. }]));
}

#[test]
fn statement_after_return_warns() {
    let source = wrap("static int f() { return 1; ; cbio.write(2); cbio.write(3); }");
    let (analyzer, _, _) = analyze(&source);
    assert_eq!(analyzer.error_count(), 0);
    assert_eq!(analyzer.warning_count(), 1);
    assert_eq!(analyzer.warnings()[0].span.line, 3);
}

#[test]
fn const_declarations() {
    let source = wrap(
        "const bool flag = true;
         const int n = \"text\";
         const int n = 2;",
    );
    let errs = errors(&source);
    assert!(matches!(errs[0], SemanticError::InvalidConstType { .. }));
    assert!(matches!(errs[1], SemanticError::ConstTypeMismatch { .. }));
    assert!(matches!(
        errs[2],
        SemanticError::DuplicateDeclaration { kind: "constant", .. }
    ));
}

#[test]
fn structs_may_be_declared_after_use() {
    let source = wrap(
        "static Later make() { Later l; l = new Later(); return l; }
         struct Later { Other[] others; }
         struct Other { Later[] back; }",
    );
    assert_eq!(check(&source), Ok(()));
}

#[test]
fn recursive_struct_is_rejected() {
    let source = wrap("struct Loop { int v; Loop next; }");
    let errs = errors(&source);
    assert!(matches!(&errs[..], [SemanticError::RecursiveStruct { name, .. }] if name == "Loop"));
}

#[test]
fn unknown_types_and_new_targets() {
    let source = wrap("static void f() { Ghost g; int[] a; a = new int[true]; }");
    let errs = errors(&source);
    assert!(matches!(errs[0], SemanticError::UnknownType { .. }));
    assert!(matches!(errs[1], SemanticError::InvalidArrayLength { .. }));
}

#[test]
fn negative_literal_array_length() {
    let source = wrap("static void f() { int[] a; a = new int[-1]; a = new int[0]; }");
    let errs = errors(&source);
    assert!(matches!(
        &errs[..],
        [SemanticError::NegativeArrayLength { value: -1, .. }]
    ));
}

#[test]
fn out_argument_must_be_assignable() {
    let source = wrap("static void f() { cbio.read(out 4); }");
    let errs = errors(&source);
    assert!(matches!(errs[0], SemanticError::InvalidOutArgument { .. }));
}

#[test]
fn out_argument_rejects_constants_and_length() {
    let source = wrap("const int N = 1;\nstatic void f() { cbio.read(out N); }");
    let errs = errors(&source);
    assert!(matches!(&errs[..], [SemanticError::InvalidOutArgument { .. }]));

    let source = wrap("static void f() { string s; s = \"ab\"; cbio.read(out s.Length); }");
    let errs = errors(&source);
    assert!(matches!(&errs[..], [SemanticError::InvalidOutArgument { .. }]));
}

#[test]
fn runtime_label_names_are_reserved() {
    let source = wrap("static int strlen(string s) { return 0; }\nstatic void malloc() {}");
    let errs = errors(&source);
    assert!(matches!(
        &errs[..],
        [
            SemanticError::ReservedMethodName { name: a, .. },
            SemanticError::ReservedMethodName { name: b, .. },
        ] if a == "strlen" && b == "malloc"
    ));

    let source = wrap("static void _L(int a) {}\nstatic void _L(bool b) {}");
    let errs = errors(&source);
    assert_eq!(errs.len(), 2);

    let source = wrap("static int length(string s) { return s.Length; }");
    assert!(check(&source).is_ok());
}

#[test]
fn out_argument_accepts_fields_and_elements() {
    let source = wrap(
        "struct P { int x; }\nstatic void f() { P p; int[] a; a = new int[2]; cbio.read(out p.x); cbio.read(out a[1]); }",
    );
    assert!(check(&source).is_ok());
}

#[test]
fn runtime_methods_are_predeclared() {
    let source = wrap("static void f() { int n; cbio.read(out n); cbio.write(n); cbio.print(n); }");
    let errs = errors(&source);
    assert!(matches!(
        &errs[..],
        [SemanticError::UndeclaredMethod { name, .. }] if name == "cbio.print"
    ));
}

#[test]
fn only_cbruntime_may_be_used() {
    let source = "using System;\nclass T { static void Main() {} }";
    let errs = errors(source);
    assert!(matches!(&errs[..], [SemanticError::InvalidUsing { name, .. }] if name == "System"));
}

#[test]
fn missing_entry_point() {
    let source = "class T { static void Main(int a) {} }";
    let errs = check(source).unwrap_err();
    assert!(matches!(errs[0].error, SemanticError::MissingEntryPoint));
    assert_eq!(errs[0].plain(), "program has no 'Main()' method");
}

#[test]
fn plain_diagnostics_carry_line_prefix() {
    let source = wrap("static void f() { y = 1; }");
    let errs = check(&source).unwrap_err();
    assert_eq!(errs[0].plain(), "3: undeclared identifier 'y'");
}
